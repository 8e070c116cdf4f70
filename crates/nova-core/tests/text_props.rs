use nova_core::{PackageName, TypeName};
use proptest::prelude::*;

const PROPTEST_CASES: u32 = 256;

fn arb_ident() -> impl Strategy<Value = String> {
    "[a-zA-Z_][a-zA-Z0-9_]{0,6}"
}

fn arb_segments(min: usize, max: usize) -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(arb_ident(), min..=max)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(PROPTEST_CASES))]

    #[test]
    fn internal_form_preserves_package_and_nesting(
        package in arb_segments(0, 4),
        nesting in arb_segments(1, 3),
    ) {
        let package = PackageName::from_dotted(&package.join("."));
        let mut name = TypeName::in_package(&package, &nesting[0]);
        for simple in &nesting[1..] {
            name = name.nested(simple);
        }

        let reparsed = TypeName::from_internal(&name.to_internal());
        prop_assert_eq!(&reparsed, &name);
        prop_assert_eq!(reparsed.package(), package);
        prop_assert_eq!(reparsed.simple_name(), nesting.last().unwrap().as_str());
        prop_assert_eq!(reparsed.enclosing().is_some(), nesting.len() > 1);
    }
}
