//! Compile-time constant folding (JLS 15.29) for `final` fields and locals.

use nova_classfile::{BaseType, ConstValue};
use nova_hir::{BinaryOp, Expr, ExprKind, Literal, TypeRefKind, UnaryOp};

use crate::binding::{Binding, BindingId, ConstantState, VariableKind};
use crate::resolver::lookup::NamePath;
use crate::resolver::scope::{base_type, Scope};
use crate::session::{FieldSource, Session};

/// Operand of a numeric operation after promotion.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Num {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
}

impl Num {
    fn of(value: &ConstValue) -> Option<Num> {
        Some(match *value {
            ConstValue::Byte(v) => Num::Int(v.into()),
            ConstValue::Short(v) => Num::Int(v.into()),
            ConstValue::Char(v) => Num::Int(v as i32),
            ConstValue::Int(v) => Num::Int(v),
            ConstValue::Long(v) => Num::Long(v),
            ConstValue::Float(v) => Num::Float(v),
            ConstValue::Double(v) => Num::Double(v),
            ConstValue::Boolean(_) | ConstValue::String(_) => return None,
        })
    }

    fn rank(self) -> u8 {
        match self {
            Num::Int(_) => 0,
            Num::Long(_) => 1,
            Num::Float(_) => 2,
            Num::Double(_) => 3,
        }
    }

    fn to_rank(self, rank: u8) -> Num {
        match (self, rank) {
            (Num::Int(v), 1) => Num::Long(v.into()),
            (Num::Int(v), 2) => Num::Float(v as f32),
            (Num::Int(v), 3) => Num::Double(v.into()),
            (Num::Long(v), 2) => Num::Float(v as f32),
            (Num::Long(v), 3) => Num::Double(v as f64),
            (Num::Float(v), 3) => Num::Double(v.into()),
            (n, _) => n,
        }
    }

    fn as_i64(self) -> i64 {
        match self {
            Num::Int(v) => v.into(),
            Num::Long(v) => v,
            Num::Float(v) => v as i64,
            Num::Double(v) => v as i64,
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            Num::Int(v) => v.into(),
            Num::Long(v) => v as f64,
            Num::Float(v) => v.into(),
            Num::Double(v) => v,
        }
    }

    fn into_const(self) -> ConstValue {
        match self {
            Num::Int(v) => ConstValue::Int(v),
            Num::Long(v) => ConstValue::Long(v),
            Num::Float(v) => ConstValue::Float(v),
            Num::Double(v) => ConstValue::Double(v),
        }
    }
}

/// Converts a constant to `target` the way an assignment or cast would.
pub(crate) fn coerce(value: ConstValue, target: BaseType) -> Option<ConstValue> {
    if let ConstValue::Boolean(b) = value {
        return (target == BaseType::Boolean).then_some(ConstValue::Boolean(b));
    }
    let num = Num::of(&value)?;
    Some(match target {
        BaseType::Boolean => return None,
        BaseType::Byte => ConstValue::Byte(num.as_i64() as i8),
        BaseType::Short => ConstValue::Short(num.as_i64() as i16),
        BaseType::Char => ConstValue::Char(char::from_u32(num.as_i64() as u16 as u32)?),
        BaseType::Int => ConstValue::Int(num.as_i64() as i32),
        BaseType::Long => ConstValue::Long(num.as_i64()),
        BaseType::Float => ConstValue::Float(num.as_f64() as f32),
        BaseType::Double => ConstValue::Double(num.as_f64()),
    })
}

/// The string form used by string concatenation.
fn concat_text(value: &ConstValue) -> String {
    match value {
        ConstValue::Float(v) if v.is_finite() && v.fract() == 0.0 => format!("{v:.1}"),
        ConstValue::Double(v) if v.is_finite() && v.fract() == 0.0 => format!("{v:.1}"),
        other => other.to_string(),
    }
}

fn literal(lit: &Literal) -> Option<ConstValue> {
    Some(match lit {
        Literal::Int(v) => ConstValue::Int(*v),
        Literal::Long(v) => ConstValue::Long(*v),
        Literal::Float(v) => ConstValue::Float(*v),
        Literal::Double(v) => ConstValue::Double(*v),
        Literal::Char(v) => ConstValue::Char(*v),
        Literal::String(v) => ConstValue::String(v.clone()),
        Literal::Boolean(v) => ConstValue::Boolean(*v),
        Literal::Null => return None,
    })
}

fn unary(op: UnaryOp, value: ConstValue) -> Option<ConstValue> {
    if let ConstValue::Boolean(b) = value {
        return (op == UnaryOp::Not).then_some(ConstValue::Boolean(!b));
    }
    let num = Num::of(&value)?;
    Some(match (op, num) {
        (UnaryOp::Plus, n) => n.into_const(),
        (UnaryOp::Minus, Num::Int(v)) => ConstValue::Int(v.wrapping_neg()),
        (UnaryOp::Minus, Num::Long(v)) => ConstValue::Long(v.wrapping_neg()),
        (UnaryOp::Minus, Num::Float(v)) => ConstValue::Float(-v),
        (UnaryOp::Minus, Num::Double(v)) => ConstValue::Double(-v),
        (UnaryOp::BitNot, Num::Int(v)) => ConstValue::Int(!v),
        (UnaryOp::BitNot, Num::Long(v)) => ConstValue::Long(!v),
        _ => return None,
    })
}

fn binary(op: BinaryOp, lhs: ConstValue, rhs: ConstValue) -> Option<ConstValue> {
    use BinaryOp::*;
    if op == Add && (matches!(lhs, ConstValue::String(_)) || matches!(rhs, ConstValue::String(_))) {
        return Some(ConstValue::String(format!("{}{}", concat_text(&lhs), concat_text(&rhs))));
    }
    if let (ConstValue::Boolean(a), ConstValue::Boolean(b)) = (&lhs, &rhs) {
        let (a, b) = (*a, *b);
        return Some(ConstValue::Boolean(match op {
            And | BitAnd => a && b,
            Or | BitOr => a || b,
            BitXor | Ne => a != b,
            Eq => a == b,
            _ => return None,
        }));
    }
    let (a, b) = (Num::of(&lhs)?, Num::of(&rhs)?);
    if matches!(op, Shl | Shr | UShr) {
        let shift = b.as_i64();
        return Some(match a {
            Num::Int(v) => {
                let s = (shift & 31) as u32;
                ConstValue::Int(match op {
                    Shl => v.wrapping_shl(s),
                    Shr => v.wrapping_shr(s),
                    _ => ((v as u32) >> s) as i32,
                })
            }
            Num::Long(v) => {
                let s = (shift & 63) as u32;
                ConstValue::Long(match op {
                    Shl => v.wrapping_shl(s),
                    Shr => v.wrapping_shr(s),
                    _ => ((v as u64) >> s) as i64,
                })
            }
            _ => return None,
        });
    }
    let rank = a.rank().max(b.rank());
    let (a, b) = (a.to_rank(rank), b.to_rank(rank));
    if matches!(op, Eq | Ne | Lt | Le | Gt | Ge) {
        let ord = a.as_f64().partial_cmp(&b.as_f64());
        let ord = match (a, b) {
            (Num::Int(x), Num::Int(y)) => Some(x.cmp(&y)),
            (Num::Long(x), Num::Long(y)) => Some(x.cmp(&y)),
            _ => ord,
        };
        use std::cmp::Ordering::*;
        return Some(ConstValue::Boolean(match (op, ord) {
            (Eq, Some(o)) => o == Equal,
            (Ne, Some(o)) => o != Equal,
            (Ne, None) => true,
            (Lt, Some(o)) => o == Less,
            (Le, Some(o)) => o != Greater,
            (Gt, Some(o)) => o == Greater,
            (Ge, Some(o)) => o != Less,
            _ => false,
        }));
    }
    Some(match (a, b) {
        (Num::Int(x), Num::Int(y)) => ConstValue::Int(match op {
            Add => x.wrapping_add(y),
            Sub => x.wrapping_sub(y),
            Mul => x.wrapping_mul(y),
            Div => x.checked_div(y).or_else(|| (y == -1).then(|| x.wrapping_neg()))?,
            Rem => x.checked_rem(y).or_else(|| (y == -1).then_some(0))?,
            BitAnd => x & y,
            BitOr => x | y,
            BitXor => x ^ y,
            _ => return None,
        }),
        (Num::Long(x), Num::Long(y)) => ConstValue::Long(match op {
            Add => x.wrapping_add(y),
            Sub => x.wrapping_sub(y),
            Mul => x.wrapping_mul(y),
            Div => x.checked_div(y).or_else(|| (y == -1).then(|| x.wrapping_neg()))?,
            Rem => x.checked_rem(y).or_else(|| (y == -1).then_some(0))?,
            BitAnd => x & y,
            BitOr => x | y,
            BitXor => x ^ y,
            _ => return None,
        }),
        (Num::Float(x), Num::Float(y)) => ConstValue::Float(match op {
            Add => x + y,
            Sub => x - y,
            Mul => x * y,
            Div => x / y,
            Rem => x % y,
            _ => return None,
        }),
        (Num::Double(x), Num::Double(y)) => ConstValue::Double(match op {
            Add => x + y,
            Sub => x - y,
            Mul => x * y,
            Div => x / y,
            Rem => x % y,
            _ => return None,
        }),
        _ => return None,
    })
}

impl<'p> Session<'p> {
    /// The compile-time constant value of a field or local, if it has one.
    ///
    /// Source constants are folded on first request; a constant whose initializer refers back
    /// to itself is not a constant.
    pub fn constant_value(&mut self, var: BindingId) -> Option<ConstValue> {
        let (declaration, state, constant) = match self.binding(var) {
            Binding::Variable(v) => (v.declaration, v.constant_state, v.constant.clone()),
            _ => return None,
        };
        if declaration != var {
            return self.constant_value(declaration);
        }
        match state {
            ConstantState::Done => return constant,
            ConstantState::InProgress => return None,
            ConstantState::Pending => {}
        }
        self.set_constant(var, ConstantState::InProgress, None);
        let value = self.fold_variable(var);
        self.set_constant(var, ConstantState::Done, value.clone());
        value
    }

    fn set_constant(&mut self, var: BindingId, state: ConstantState, value: Option<ConstValue>) {
        if let Binding::Variable(v) = self.interner.get_mut(var) {
            v.constant_state = state;
            v.constant = value;
        }
    }

    fn fold_variable(&mut self, var: BindingId) -> Option<ConstValue> {
        let (kind, declaring, ty) = match self.binding(var) {
            Binding::Variable(v) if v.modifiers.is_final => (v.kind, v.declaring, v.ty),
            _ => return None,
        };
        let (scope, locals, init) = match kind {
            VariableKind::Field => {
                let &(source, field) = self.field_decls.get(&var)?;
                let FieldSource::Field(field) = field else {
                    return None;
                };
                let scope = Scope::new(source.file, source.unit, self.enclosing_chain(declaring));
                (scope, Vec::new(), field.initializer.as_ref()?)
            }
            VariableKind::Local => {
                let init = *self.local_inits.get(&var)?;
                let scope = self.method_scope(declaring)?;
                let locals = self.member_locals.get(&declaring).cloned().unwrap_or_default();
                let position = locals.iter().position(|&l| l == var)?;
                (scope, locals[..position].to_vec(), init)
            }
            VariableKind::EnumConstant | VariableKind::Parameter => return None,
        };
        let value = self.fold(&scope, &locals, init)?;
        self.coerce_to(value, ty)
    }

    /// Converts a folded value to the declared type; only primitive and `String` variables
    /// hold constants.
    pub(crate) fn coerce_to(&mut self, value: ConstValue, ty: BindingId) -> Option<ConstValue> {
        match self.binding(ty) {
            Binding::Primitive(base) => coerce(value, *base),
            Binding::Type(decl) if decl.name.as_str() == "java.lang.String" => {
                matches!(value, ConstValue::String(_)).then_some(value)
            }
            _ => None,
        }
    }

    /// Folds a constant expression; `locals` are the locals visible to it, in declaration order.
    pub(crate) fn fold(
        &mut self,
        scope: &Scope<'p>,
        locals: &[BindingId],
        expr: &Expr,
    ) -> Option<ConstValue> {
        match &expr.kind {
            ExprKind::Literal(lit) => literal(lit),
            ExprKind::Paren(inner) => self.fold(scope, locals, inner),
            ExprKind::Unary { op, expr } => {
                let value = self.fold(scope, locals, expr)?;
                unary(*op, value)
            }
            ExprKind::Binary { op, lhs, rhs } => {
                let lhs = self.fold(scope, locals, lhs)?;
                let rhs = self.fold(scope, locals, rhs)?;
                binary(*op, lhs, rhs)
            }
            ExprKind::Cast { ty, expr } => {
                let value = self.fold(scope, locals, expr)?;
                match &ty.kind {
                    TypeRefKind::Primitive(prim) => coerce(value, base_type(*prim)),
                    _ => {
                        let target = self.resolve_type(scope, ty, false, &mut Vec::new())?;
                        self.coerce_to(value, target)
                    }
                }
            }
            ExprKind::Name(name) => {
                let local = locals.iter().rev().copied().find(|&local| {
                    matches!(self.binding(local), Binding::Variable(v) if &v.name == name)
                });
                let var = match local {
                    Some(local) => local,
                    None => self.lookup_field_in_scope(scope, name)?,
                };
                self.constant_value(var)
            }
            ExprKind::FieldAccess { target, name } => {
                let Some(NamePath::Type(owner)) = self.name_path(scope, target) else {
                    return None;
                };
                let field = self.find_field(owner, name)?;
                self.constant_value(field)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn arithmetic_follows_numeric_promotion() {
        assert_eq!(
            binary(BinaryOp::Add, ConstValue::Int(1), ConstValue::Long(2)),
            Some(ConstValue::Long(3))
        );
        assert_eq!(
            binary(BinaryOp::Div, ConstValue::Int(7), ConstValue::Int(2)),
            Some(ConstValue::Int(3))
        );
        assert_eq!(binary(BinaryOp::Div, ConstValue::Int(7), ConstValue::Int(0)), None);
        assert_eq!(
            binary(BinaryOp::Shl, ConstValue::Int(1), ConstValue::Long(33)),
            Some(ConstValue::Int(2))
        );
        assert_eq!(
            binary(BinaryOp::Lt, ConstValue::Char('a'), ConstValue::Int(98)),
            Some(ConstValue::Boolean(true))
        );
    }

    #[test]
    fn string_concatenation_formats_operands() {
        assert_eq!(
            binary(BinaryOp::Add, ConstValue::String("v".into()), ConstValue::Double(1.0)),
            Some(ConstValue::String("v1.0".into()))
        );
        assert_eq!(
            binary(BinaryOp::Add, ConstValue::Char('x'), ConstValue::String("y".into())),
            Some(ConstValue::String("xy".into()))
        );
    }

    #[test]
    fn coercion_narrows_like_an_assignment() {
        assert_eq!(coerce(ConstValue::Int(300), BaseType::Byte), Some(ConstValue::Byte(44)));
        assert_eq!(coerce(ConstValue::Int(65), BaseType::Char), Some(ConstValue::Char('A')));
        assert_eq!(coerce(ConstValue::Boolean(true), BaseType::Int), None);
        assert_eq!(unary(UnaryOp::Not, ConstValue::Boolean(true)), Some(ConstValue::Boolean(false)));
    }
}
