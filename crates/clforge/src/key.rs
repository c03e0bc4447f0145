//! Canonical problem signatures for cache lookup.
//!
//! Keys are a deterministic, order-sensitive concatenation of every field
//! that influences kernel choice or specialization parameters. They are an
//! injective string encoding, not a digest: two problems that would need
//! different generated parameters can never collide.

use std::fmt;
use std::fmt::Write as _;

use crate::shape::NchwLayout;

/// Opaque cache signature for one problem instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConfigKey(String);

impl ConfigKey {
    pub fn builder(path: &str) -> ConfigKeyBuilder {
        ConfigKeyBuilder {
            buf: path.to_string(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Appends labeled fields in a fixed order. Labels keep the encoding
/// injective: fields can never shift into one another because every value is
/// preceded by its name and fields are `-` separated while list elements are
/// `x` separated.
pub struct ConfigKeyBuilder {
    buf: String,
}

impl ConfigKeyBuilder {
    pub fn field(mut self, name: &str, value: impl fmt::Display) -> Self {
        let _ = write!(self.buf, "-{name}:{value}");
        self
    }

    pub fn extents(mut self, name: &str, values: &[usize]) -> Self {
        let _ = write!(self.buf, "-{name}:");
        for (i, v) in values.iter().enumerate() {
            if i > 0 {
                self.buf.push('x');
            }
            let _ = write!(self.buf, "{v}");
        }
        self
    }

    pub fn layout(self, name: &str, layout: &NchwLayout) -> Self {
        self.extents(name, &[layout.n, layout.c, layout.h, layout.w])
            .extents(
                &format!("{name}s"),
                &[
                    layout.n_stride,
                    layout.c_stride,
                    layout.h_stride,
                    layout.w_stride,
                ],
            )
    }

    pub fn finish(self) -> ConfigKey {
        ConfigKey(self.buf)
    }
}
