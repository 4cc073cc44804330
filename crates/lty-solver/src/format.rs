//! Human-readable rendering of type values.
//!
//! - a class renders as its name
//! - a union renders its alternatives joined by `|`
//! - a function renders as `(params) -> ret`

use crate::types::Ty;
use std::fmt::{self, Write};

/// Renders types for hovers and diagnostics.
pub struct TypeFormatter {
    max_union_members: usize,
}

impl Default for TypeFormatter {
    fn default() -> Self {
        TypeFormatter {
            max_union_members: 16,
        }
    }
}

impl TypeFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Truncate unions longer than `max` with `|...`.
    pub fn with_max_union_members(mut self, max: usize) -> Self {
        self.max_union_members = max.max(1);
        self
    }

    pub fn format(&self, ty: &Ty) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.write(&mut out, ty, false);
        out
    }

    /// `nested` is set when `ty` appears inside a union or array, where a
    /// bare function or union would be ambiguous.
    fn write(&self, out: &mut String, ty: &Ty, nested: bool) -> fmt::Result {
        match ty {
            Ty::Unknown => out.write_str("unknown"),
            Ty::Nil => out.write_str("nil"),
            Ty::Boolean => out.write_str("boolean"),
            Ty::Number => out.write_str("number"),
            Ty::String => out.write_str("string"),
            Ty::StringLiteral(text) => write!(out, "{:?}", text.as_str()),
            Ty::Class(class) => out.write_str(&class.name),
            Ty::Generic(name) => out.write_str(name),
            Ty::AliasRef(alias) => {
                out.write_str(&alias.name)?;
                if !alias.args.is_empty() {
                    out.write_char('<')?;
                    self.write_list(out, &alias.args)?;
                    out.write_char('>')?;
                }
                Ok(())
            }
            Ty::Array(element) => {
                self.write(out, element, true)?;
                out.write_str("[]")
            }
            Ty::Tuple(elements) => {
                out.write_char('[')?;
                self.write_list(out, elements)?;
                out.write_char(']')
            }
            Ty::Union(union) => {
                if nested {
                    out.write_char('(')?;
                }
                for (i, alt) in union.alternatives().iter().enumerate() {
                    if i == self.max_union_members {
                        out.write_str("|...")?;
                        break;
                    }
                    if i > 0 {
                        out.write_char('|')?;
                    }
                    self.write(out, alt, true)?;
                }
                if nested {
                    out.write_char(')')?;
                }
                Ok(())
            }
            Ty::Function(function) => {
                if nested {
                    out.write_char('(')?;
                }
                out.write_char('(')?;
                self.write_list(out, &function.params)?;
                if function.variadic {
                    if !function.params.is_empty() {
                        out.write_str(", ")?;
                    }
                    out.write_str("...")?;
                }
                out.write_str(") -> ")?;
                self.write(out, &function.ret, false)?;
                if nested {
                    out.write_char(')')?;
                }
                Ok(())
            }
        }
    }

    fn write_list(&self, out: &mut String, items: &[Ty]) -> fmt::Result {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                out.write_str(", ")?;
            }
            self.write(out, item, false)?;
        }
        Ok(())
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&TypeFormatter::default().format(self))
    }
}

#[cfg(test)]
#[path = "../tests/format_tests.rs"]
mod tests;
