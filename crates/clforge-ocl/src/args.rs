use std::collections::HashMap;

use crate::queue::KernelArg;

/// Ordered, name-addressable launch argument list.
///
/// Arguments bind positionally at launch, but the assembly sites name each
/// one so mistakes surface as a readable name rather than an index. Pushing
/// an existing name replaces the value in place without disturbing the
/// positional order.
#[derive(Debug, Clone)]
pub struct OperatorArgs<B> {
    by_name: HashMap<String, usize>,
    ordered: Vec<KernelArg<B>>,
}

impl<B> OperatorArgs<B> {
    pub fn new() -> Self {
        Self {
            by_name: HashMap::new(),
            ordered: Vec::new(),
        }
    }

    pub fn push(&mut self, name: impl Into<String>, arg: KernelArg<B>) -> &mut Self {
        let name = name.into();
        match self.by_name.get(&name) {
            Some(&index) => {
                self.ordered[index] = arg;
            }
            None => {
                self.by_name.insert(name, self.ordered.len());
                self.ordered.push(arg);
            }
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&KernelArg<B>> {
        self.by_name.get(name).map(|&index| &self.ordered[index])
    }

    pub fn as_slice(&self) -> &[KernelArg<B>] {
        &self.ordered
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}

impl<B> Default for OperatorArgs<B> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_preserves_order_and_replaces_by_name() {
        let mut args: OperatorArgs<u64> = OperatorArgs::new();
        args.push("x", KernelArg::Buffer(1));
        args.push("alpha", KernelArg::F32(1.0));
        args.push("x", KernelArg::Buffer(2));

        assert_eq!(args.len(), 2);
        assert_eq!(args.as_slice()[0], KernelArg::Buffer(2));
        assert_eq!(args.get("alpha"), Some(&KernelArg::F32(1.0)));
    }
}
