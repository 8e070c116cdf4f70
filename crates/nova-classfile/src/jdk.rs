//! A small, hand-maintained subset of the JDK used when no real JDK index is configured.

use crate::annotation::{ConstValue, ElementValue};
use crate::error::Result;
use crate::index::StubIndex;
use crate::stub::{
    ClassStub, FieldStub, MethodStub, ACC_ABSTRACT, ACC_ANNOTATION, ACC_ENUM, ACC_FINAL,
    ACC_INTERFACE, ACC_PUBLIC, ACC_STATIC, ACC_VARARGS,
};

const PUBLIC_STATIC: u16 = ACC_PUBLIC | ACC_STATIC;
const PUBLIC_ABSTRACT: u16 = ACC_PUBLIC | ACC_ABSTRACT;
const INTERFACE: u16 = ACC_PUBLIC | ACC_INTERFACE | ACC_ABSTRACT;
const ANNOTATION: u16 = INTERFACE | ACC_ANNOTATION;
const CONSTANT: u16 = ACC_PUBLIC | ACC_STATIC | ACC_FINAL;

impl StubIndex {
    /// The minimal JDK: `java.lang` essentials, boxes, a few collections and annotations.
    pub fn minimal_jdk() -> Self {
        build_minimal_jdk().expect("minimal JDK stubs are well-formed")
    }
}

fn class(name: &str, flags: u16) -> ClassStub {
    ClassStub::new(name, flags).with_super("java/lang/Object")
}

fn iface(name: &str) -> ClassStub {
    ClassStub::new(name, INTERFACE).with_super("java/lang/Object")
}

fn method(flags: u16, name: &str, desc: &str) -> Result<MethodStub> {
    MethodStub::new(flags, name, desc)
}

fn generic(flags: u16, name: &str, desc: &str, sig: &str) -> Result<MethodStub> {
    MethodStub::new(flags, name, desc)?.with_signature(sig)
}

fn boxed(name: &str, primitive: char, max: ConstValue) -> Result<ClassStub> {
    let internal = format!("java/lang/{name}");
    let super_class = match name {
        "Boolean" | "Character" => "java/lang/Object",
        _ => "java/lang/Number",
    };
    Ok(ClassStub::new(internal.as_str(), ACC_PUBLIC | ACC_FINAL)
        .with_super(super_class)
        .with_interface("java/lang/Comparable")
        .with_signature(&format!(
            "L{super_class};Ljava/lang/Comparable<L{internal};>;"
        ))?
        .with_field(FieldStub::new(CONSTANT, "MAX_VALUE", &primitive.to_string())?.with_constant(max))
        .with_method(method(
            PUBLIC_STATIC,
            "valueOf",
            &format!("({primitive})L{internal};"),
        )?)
        .with_method(method(
            ACC_PUBLIC,
            &format!("{}Value", primitive_keyword(primitive)),
            &format!("(){primitive}"),
        )?))
}

fn primitive_keyword(c: char) -> &'static str {
    match c {
        'Z' => "boolean",
        'C' => "char",
        'B' => "byte",
        'S' => "short",
        'I' => "int",
        'J' => "long",
        'F' => "float",
        _ => "double",
    }
}

fn build_minimal_jdk() -> Result<StubIndex> {
    let mut index = StubIndex::new();

    index.insert(
        ClassStub::new("java/lang/Object", ACC_PUBLIC)
            .with_method(method(ACC_PUBLIC, "<init>", "()V")?)
            .with_method(method(ACC_PUBLIC, "toString", "()Ljava/lang/String;")?)
            .with_method(method(ACC_PUBLIC, "equals", "(Ljava/lang/Object;)Z")?)
            .with_method(method(ACC_PUBLIC, "hashCode", "()I")?)
            .with_method(generic(
                ACC_PUBLIC | ACC_FINAL,
                "getClass",
                "()Ljava/lang/Class;",
                "()Ljava/lang/Class<*>;",
            )?),
    );
    index.insert(
        class("java/lang/String", ACC_PUBLIC | ACC_FINAL)
            .with_interface("java/lang/CharSequence")
            .with_interface("java/lang/Comparable")
            .with_signature(
                "Ljava/lang/Object;Ljava/lang/CharSequence;Ljava/lang/Comparable<Ljava/lang/String;>;",
            )?
            .with_method(method(ACC_PUBLIC, "<init>", "()V")?)
            .with_method(method(ACC_PUBLIC, "length", "()I")?)
            .with_method(method(ACC_PUBLIC, "charAt", "(I)C")?)
            .with_method(method(ACC_PUBLIC, "concat", "(Ljava/lang/String;)Ljava/lang/String;")?)
            .with_method(method(ACC_PUBLIC, "compareTo", "(Ljava/lang/String;)I")?)
            .with_method(method(
                PUBLIC_STATIC,
                "valueOf",
                "(Ljava/lang/Object;)Ljava/lang/String;",
            )?)
            .with_method(method(PUBLIC_STATIC, "valueOf", "(I)Ljava/lang/String;")?)
            .with_method(method(
                PUBLIC_STATIC | ACC_VARARGS,
                "format",
                "(Ljava/lang/String;[Ljava/lang/Object;)Ljava/lang/String;",
            )?),
    );
    index.insert(
        iface("java/lang/CharSequence").with_method(method(PUBLIC_ABSTRACT, "length", "()I")?),
    );
    index.insert(
        iface("java/lang/Comparable")
            .with_signature("<T:Ljava/lang/Object;>Ljava/lang/Object;")?
            .with_method(generic(
                PUBLIC_ABSTRACT,
                "compareTo",
                "(Ljava/lang/Object;)I",
                "(TT;)I",
            )?),
    );
    index.insert(iface("java/lang/Cloneable"));
    index.insert(iface("java/io/Serializable"));
    index.insert(iface("java/lang/Runnable").with_method(method(PUBLIC_ABSTRACT, "run", "()V")?));
    index.insert(
        class("java/lang/Class", ACC_PUBLIC | ACC_FINAL)
            .with_signature("<T:Ljava/lang/Object;>Ljava/lang/Object;")?
            .with_method(method(ACC_PUBLIC, "getName", "()Ljava/lang/String;")?),
    );
    index.insert(
        class("java/lang/Number", PUBLIC_ABSTRACT)
            .with_interface("java/io/Serializable")
            .with_method(method(PUBLIC_ABSTRACT, "intValue", "()I")?),
    );
    index.insert(boxed("Integer", 'I', ConstValue::Int(i32::MAX))?);
    index.insert(boxed("Long", 'J', ConstValue::Long(i64::MAX))?);
    index.insert(boxed("Short", 'S', ConstValue::Short(i16::MAX))?);
    index.insert(boxed("Byte", 'B', ConstValue::Byte(i8::MAX))?);
    index.insert(boxed("Double", 'D', ConstValue::Double(f64::MAX))?);
    index.insert(boxed("Float", 'F', ConstValue::Float(f32::MAX))?);
    index.insert(boxed("Character", 'C', ConstValue::Char('\u{ffff}'))?);
    index.insert(boxed("Boolean", 'Z', ConstValue::Boolean(true))?);
    index.insert(class("java/lang/Void", ACC_PUBLIC | ACC_FINAL));
    index.insert(
        class("java/lang/Math", ACC_PUBLIC | ACC_FINAL)
            .with_field(
                FieldStub::new(CONSTANT, "PI", "D")?.with_constant(ConstValue::Double(std::f64::consts::PI)),
            )
            .with_method(method(PUBLIC_STATIC, "max", "(II)I")?)
            .with_method(method(PUBLIC_STATIC, "max", "(JJ)J")?)
            .with_method(method(PUBLIC_STATIC, "abs", "(I)I")?),
    );
    index.insert(
        ClassStub::new("java/lang/Enum", PUBLIC_ABSTRACT)
            .with_super("java/lang/Object")
            .with_interface("java/lang/Comparable")
            .with_signature(
                "<E:Ljava/lang/Enum<TE;>;>Ljava/lang/Object;Ljava/lang/Comparable<TE;>;Ljava/io/Serializable;",
            )?
            .with_method(method(ACC_PUBLIC | ACC_FINAL, "name", "()Ljava/lang/String;")?)
            .with_method(method(ACC_PUBLIC | ACC_FINAL, "ordinal", "()I")?),
    );
    index.insert(
        iface("java/lang/Iterable")
            .with_signature("<T:Ljava/lang/Object;>Ljava/lang/Object;")?
            .with_method(generic(
                PUBLIC_ABSTRACT,
                "iterator",
                "()Ljava/util/Iterator;",
                "()Ljava/util/Iterator<TT;>;",
            )?),
    );
    index.insert(
        iface("java/util/Iterator")
            .with_signature("<E:Ljava/lang/Object;>Ljava/lang/Object;")?
            .with_method(method(PUBLIC_ABSTRACT, "hasNext", "()Z")?)
            .with_method(generic(PUBLIC_ABSTRACT, "next", "()Ljava/lang/Object;", "()TE;")?),
    );
    index.insert(
        iface("java/util/Collection")
            .with_interface("java/lang/Iterable")
            .with_signature("<E:Ljava/lang/Object;>Ljava/lang/Object;Ljava/lang/Iterable<TE;>;")?
            .with_method(method(PUBLIC_ABSTRACT, "size", "()I")?)
            .with_method(generic(PUBLIC_ABSTRACT, "add", "(Ljava/lang/Object;)Z", "(TE;)Z")?),
    );
    index.insert(
        iface("java/util/List")
            .with_interface("java/util/Collection")
            .with_signature("<E:Ljava/lang/Object;>Ljava/lang/Object;Ljava/util/Collection<TE;>;")?
            .with_method(generic(PUBLIC_ABSTRACT, "get", "(I)Ljava/lang/Object;", "(I)TE;")?)
            .with_method(generic(PUBLIC_ABSTRACT, "add", "(Ljava/lang/Object;)Z", "(TE;)Z")?),
    );
    index.insert(
        iface("java/util/Set")
            .with_interface("java/util/Collection")
            .with_signature("<E:Ljava/lang/Object;>Ljava/lang/Object;Ljava/util/Collection<TE;>;")?,
    );
    index.insert(
        class("java/util/ArrayList", ACC_PUBLIC)
            .with_interface("java/util/List")
            .with_signature("<E:Ljava/lang/Object;>Ljava/lang/Object;Ljava/util/List<TE;>;")?
            .with_method(method(ACC_PUBLIC, "<init>", "()V")?)
            .with_method(generic(ACC_PUBLIC, "get", "(I)Ljava/lang/Object;", "(I)TE;")?),
    );
    index.insert(
        iface("java/util/Map")
            .with_signature("<K:Ljava/lang/Object;V:Ljava/lang/Object;>Ljava/lang/Object;")?
            .with_method(generic(
                PUBLIC_ABSTRACT,
                "get",
                "(Ljava/lang/Object;)Ljava/lang/Object;",
                "(Ljava/lang/Object;)TV;",
            )?)
            .with_method(generic(
                PUBLIC_ABSTRACT,
                "put",
                "(Ljava/lang/Object;Ljava/lang/Object;)Ljava/lang/Object;",
                "(TK;TV;)TV;",
            )?)
            .with_method(generic(
                PUBLIC_ABSTRACT,
                "entrySet",
                "()Ljava/util/Set;",
                "()Ljava/util/Set<Ljava/util/Map$Entry<TK;TV;>;>;",
            )?),
    );
    index.insert(
        ClassStub::new("java/util/Map$Entry", INTERFACE | ACC_STATIC)
            .with_super("java/lang/Object")
            .with_signature("<K:Ljava/lang/Object;V:Ljava/lang/Object;>Ljava/lang/Object;")?
            .with_method(generic(PUBLIC_ABSTRACT, "getKey", "()Ljava/lang/Object;", "()TK;")?)
            .with_method(generic(PUBLIC_ABSTRACT, "getValue", "()Ljava/lang/Object;", "()TV;")?),
    );
    index.insert(
        class("java/util/Collections", ACC_PUBLIC)
            .with_method(generic(
                PUBLIC_STATIC,
                "emptyList",
                "()Ljava/util/List;",
                "<T:Ljava/lang/Object;>()Ljava/util/List<TT;>;",
            )?)
            .with_method(generic(
                PUBLIC_STATIC,
                "singletonList",
                "(Ljava/lang/Object;)Ljava/util/List;",
                "<T:Ljava/lang/Object;>(TT;)Ljava/util/List<TT;>;",
            )?)
            .with_method(generic(
                PUBLIC_STATIC,
                "max",
                "(Ljava/util/Collection;)Ljava/lang/Object;",
                "<T:Ljava/lang/Object;:Ljava/lang/Comparable<-TT;>;>(Ljava/util/Collection<+TT;>;)TT;",
            )?),
    );
    index.insert(
        class("java/util/Arrays", ACC_PUBLIC).with_method(generic(
            PUBLIC_STATIC | ACC_VARARGS,
            "asList",
            "([Ljava/lang/Object;)Ljava/util/List;",
            "<T:Ljava/lang/Object;>([TT;)Ljava/util/List<TT;>;",
        )?),
    );
    index.insert(iface("java/lang/annotation/Annotation"));
    index.insert(
        class("java/lang/annotation/RetentionPolicy", ACC_PUBLIC | ACC_FINAL | ACC_ENUM)
            .with_super("java/lang/Enum")
            .with_signature(
                "Ljava/lang/Enum<Ljava/lang/annotation/RetentionPolicy;>;",
            )?
            .with_field(FieldStub::new(
                CONSTANT | ACC_ENUM,
                "SOURCE",
                "Ljava/lang/annotation/RetentionPolicy;",
            )?)
            .with_field(FieldStub::new(
                CONSTANT | ACC_ENUM,
                "CLASS",
                "Ljava/lang/annotation/RetentionPolicy;",
            )?)
            .with_field(FieldStub::new(
                CONSTANT | ACC_ENUM,
                "RUNTIME",
                "Ljava/lang/annotation/RetentionPolicy;",
            )?),
    );
    index.insert(
        ClassStub::new("java/lang/annotation/Retention", ANNOTATION)
            .with_super("java/lang/Object")
            .with_interface("java/lang/annotation/Annotation")
            .with_method(method(
                PUBLIC_ABSTRACT,
                "value",
                "()Ljava/lang/annotation/RetentionPolicy;",
            )?),
    );
    index.insert(
        ClassStub::new("java/lang/Deprecated", ANNOTATION)
            .with_super("java/lang/Object")
            .with_interface("java/lang/annotation/Annotation")
            .with_method(
                method(PUBLIC_ABSTRACT, "since", "()Ljava/lang/String;")?
                    .with_default(ElementValue::Const(ConstValue::String(String::new()))),
            )
            .with_method(
                method(PUBLIC_ABSTRACT, "forRemoval", "()Z")?
                    .with_default(ElementValue::Const(ConstValue::Boolean(false))),
            ),
    );
    index.insert(
        ClassStub::new("java/lang/SuppressWarnings", ANNOTATION)
            .with_super("java/lang/Object")
            .with_interface("java/lang/annotation/Annotation")
            .with_method(method(PUBLIC_ABSTRACT, "value", "()[Ljava/lang/String;")?),
    );

    Ok(index)
}

#[cfg(test)]
mod tests {
    use crate::index::{ClassProvider, StubIndex};
    use crate::signature::TypeSignature;

    #[test]
    fn minimal_jdk_contains_generic_collections() {
        let jdk = StubIndex::minimal_jdk();
        let list = jdk.lookup_class("java/util/List").unwrap();
        let sig = list.signature.as_ref().unwrap();
        assert_eq!(sig.type_parameters[0].name, "E");
        assert_eq!(sig.interfaces[0].internal_name(), "java/util/Collection");

        let entry = jdk.lookup_class("java/util/Map$Entry").unwrap();
        assert!(entry.is_interface());
        assert_eq!(jdk.member_classes("java/util/Map"), vec!["java/util/Map$Entry"]);

        let max = jdk
            .lookup_class("java/util/Collections")
            .unwrap()
            .methods
            .iter()
            .find(|m| m.name == "max")
            .unwrap();
        let sig = max.signature.as_ref().unwrap();
        assert_eq!(sig.type_parameters[0].interface_bounds.len(), 1);
        assert_eq!(sig.return_type, Some(TypeSignature::TypeVariable("T".into())));
    }
}
