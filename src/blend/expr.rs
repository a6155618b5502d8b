use crate::blend::catalogue::Helper;

/// Scalar blend expression over one color channel.
///
/// `Base` is the channel of the accumulated (destination) color, `Blend` the channel of the
/// incoming (source) color. Trees are built from `&'static` nodes so the whole formula table
/// can live in read-only statics.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Expr {
    Base,
    Blend,
    Const(f32),
    Add(&'static Expr, &'static Expr),
    Sub(&'static Expr, &'static Expr),
    Mul(&'static Expr, &'static Expr),
    Div(&'static Expr, &'static Expr),
    Min(&'static Expr, &'static Expr),
    Max(&'static Expr, &'static Expr),
    Abs(&'static Expr),
    Sqrt(&'static Expr),
    /// Piecewise choice. Only the selected branch is evaluated by the interpreter.
    Select {
        cond: Cond,
        then: &'static Expr,
        otherwise: &'static Expr,
    },
    /// Invoke a library helper with `(base, blend)` bound to the two argument expressions.
    Call(Helper, &'static Expr, &'static Expr),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Cond {
    Lt(&'static Expr, &'static Expr),
    Eq(&'static Expr, &'static Expr),
}

impl Expr {
    pub fn eval(&self, base: f32, blend: f32) -> f32 {
        match *self {
            Expr::Base => base,
            Expr::Blend => blend,
            Expr::Const(c) => c,
            Expr::Add(a, b) => a.eval(base, blend) + b.eval(base, blend),
            Expr::Sub(a, b) => a.eval(base, blend) - b.eval(base, blend),
            Expr::Mul(a, b) => a.eval(base, blend) * b.eval(base, blend),
            Expr::Div(a, b) => a.eval(base, blend) / b.eval(base, blend),
            Expr::Min(a, b) => a.eval(base, blend).min(b.eval(base, blend)),
            Expr::Max(a, b) => a.eval(base, blend).max(b.eval(base, blend)),
            Expr::Abs(a) => a.eval(base, blend).abs(),
            Expr::Sqrt(a) => a.eval(base, blend).sqrt(),
            Expr::Select {
                cond,
                then,
                otherwise,
            } => {
                if cond.eval(base, blend) {
                    then.eval(base, blend)
                } else {
                    otherwise.eval(base, blend)
                }
            }
            Expr::Call(helper, a, b) => helper.eval(a.eval(base, blend), b.eval(base, blend)),
        }
    }
}

impl Cond {
    pub fn eval(&self, base: f32, blend: f32) -> bool {
        match *self {
            Cond::Lt(a, b) => a.eval(base, blend) < b.eval(base, blend),
            Cond::Eq(a, b) => a.eval(base, blend) == b.eval(base, blend),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/blend/expr.rs"]
mod tests;
