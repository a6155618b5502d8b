//! Formula compiler: lowers the per-channel blend trees to WGSL source.
//!
//! Every formula is written for one scalar channel. To run it over RGB the compiler substitutes
//! channel-qualified operands (`base.r`, `blend.r`, ...) once per channel and composes the three
//! scalar results into a `vec3<f32>`.

use std::fmt::Write as _;

use crate::blend::{
    catalogue::{BlendFormula, Helper},
    expr::{Cond, Expr},
};

const CHANNELS: [char; 3] = ['r', 'g', 'b'];

/// Names the two operands are emitted as.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Operands<'a> {
    pub base: &'a str,
    pub blend: &'a str,
}

impl Operands<'static> {
    pub const DEFAULT: Operands<'static> = Operands {
        base: "base",
        blend: "blend",
    };
}

impl<'a> Operands<'a> {
    /// Exchange the operand roles, as hard light does with overlay.
    pub fn swapped(self) -> Self {
        Self {
            base: self.blend,
            blend: self.base,
        }
    }
}

/// Emit `expr` as a scalar WGSL expression with the operands named by `ops`.
pub fn emit_scalar(expr: &Expr, ops: Operands<'_>) -> String {
    let mut out = String::new();
    write_expr(&mut out, expr, ops);
    out
}

/// Broadcast `expr` over the three color channels: `vec3<f32>(e.r, e.g, e.b)`.
pub fn compile_vector(expr: &Expr, ops: Operands<'_>) -> String {
    let parts: Vec<String> = CHANNELS
        .iter()
        .map(|c| {
            let base = format!("{}.{c}", ops.base);
            let blend = format!("{}.{c}", ops.blend);
            emit_scalar(
                expr,
                Operands {
                    base: &base,
                    blend: &blend,
                },
            )
        })
        .collect();
    format!("vec3<f32>({})", parts.join(", "))
}

/// Compile a catalogue formula to its vector expression.
pub fn compile_formula(formula: BlendFormula, ops: Operands<'_>) -> String {
    match formula {
        BlendFormula::Direct(expr) => compile_vector(expr, ops),
        BlendFormula::Helper { helper, swapped } => {
            let call = Expr::Call(helper, &Expr::Base, &Expr::Blend);
            let ops = if swapped { ops.swapped() } else { ops };
            compile_vector(&call, ops)
        }
    }
}

/// `fn <name>(base: f32, blend: f32) -> f32 { ... }` for one library helper.
pub fn emit_helper_fn(helper: Helper) -> String {
    format!(
        "fn {}(base: f32, blend: f32) -> f32 {{\n  return {};\n}}\n",
        helper.fn_name(),
        emit_scalar(helper.body(), Operands::DEFAULT)
    )
}

/// The complete helper library, in dependency order.
pub fn helper_library() -> String {
    let mut out = String::new();
    for helper in Helper::all() {
        out.push_str(&emit_helper_fn(*helper));
    }
    out
}

fn write_expr(out: &mut String, expr: &Expr, ops: Operands<'_>) {
    match *expr {
        Expr::Base => out.push_str(ops.base),
        Expr::Blend => out.push_str(ops.blend),
        Expr::Const(c) => write_float(out, c),
        Expr::Add(a, b) => write_infix(out, a, "+", b, ops),
        Expr::Sub(a, b) => write_infix(out, a, "-", b, ops),
        Expr::Mul(a, b) => write_infix(out, a, "*", b, ops),
        Expr::Div(a, b) => write_infix(out, a, "/", b, ops),
        Expr::Min(a, b) => write_call(out, "min", a, b, ops),
        Expr::Max(a, b) => write_call(out, "max", a, b, ops),
        Expr::Abs(a) => {
            out.push_str("abs(");
            write_expr(out, a, ops);
            out.push(')');
        }
        Expr::Sqrt(a) => {
            out.push_str("sqrt(");
            write_expr(out, a, ops);
            out.push(')');
        }
        Expr::Select {
            cond,
            then,
            otherwise,
        } => {
            // WGSL has no ternary: select(false_value, true_value, condition).
            out.push_str("select(");
            write_expr(out, otherwise, ops);
            out.push_str(", ");
            write_expr(out, then, ops);
            out.push_str(", ");
            write_cond(out, cond, ops);
            out.push(')');
        }
        Expr::Call(helper, a, b) => write_call(out, helper.fn_name(), a, b, ops),
    }
}

fn write_cond(out: &mut String, cond: Cond, ops: Operands<'_>) {
    let (a, op, b) = match cond {
        Cond::Lt(a, b) => (a, "<", b),
        Cond::Eq(a, b) => (a, "==", b),
    };
    write_infix(out, a, op, b, ops);
}

fn write_infix(out: &mut String, a: &Expr, op: &str, b: &Expr, ops: Operands<'_>) {
    out.push('(');
    write_expr(out, a, ops);
    let _ = write!(out, " {op} ");
    write_expr(out, b, ops);
    out.push(')');
}

fn write_call(out: &mut String, name: &str, a: &Expr, b: &Expr, ops: Operands<'_>) {
    out.push_str(name);
    out.push('(');
    write_expr(out, a, ops);
    out.push_str(", ");
    write_expr(out, b, ops);
    out.push(')');
}

fn write_float(out: &mut String, v: f32) {
    // `{:?}` always keeps a fractional part ("1.0"), which WGSL needs to type the literal as f32.
    let _ = write!(out, "{v:?}");
}

#[cfg(test)]
#[path = "../../tests/unit/blend/compile.rs"]
mod tests;
