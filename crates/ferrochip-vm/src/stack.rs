use crate::constants::STACK_DEPTH;
use crate::error::Fault;

/// Return addresses of up to 16 nested subroutine calls
#[derive(Clone, Copy, Default)]
pub struct Stack {
    values: [u16; STACK_DEPTH],
    depth: usize,
}

impl Stack {
    /// Pushes `return_address` before jumping to `target`
    pub fn push(&mut self, return_address: u16, target: u16) -> Result<(), Fault> {
        let slot = self
            .values
            .get_mut(self.depth)
            .ok_or(Fault::StackOverflow { target })?;
        *slot = return_address;
        self.depth += 1;
        Ok(())
    }

    pub fn pop(&mut self) -> Result<u16, Fault> {
        self.depth = self.depth.checked_sub(1).ok_or(Fault::StackUnderflow)?;
        Ok(self.values[self.depth])
    }

    pub fn depth(&self) -> usize {
        self.depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overflows_after_sixteen_calls() {
        let mut stack = Stack::default();
        for i in 0..STACK_DEPTH as u16 {
            stack.push(i, 0x300).unwrap();
        }
        assert_eq!(
            stack.push(0, 0x300),
            Err(Fault::StackOverflow { target: 0x300 })
        );
        assert_eq!(stack.pop(), Ok(15));
    }

    #[test]
    fn underflows_when_empty() {
        assert_eq!(Stack::default().pop(), Err(Fault::StackUnderflow));
    }
}
