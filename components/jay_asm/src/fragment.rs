//! Assembly fragment - generated code with stack depth accounting.
//!
//! A fragment is created fresh for each AST node the generator visits and
//! never shared. `max_stack_depth` is the high-water mark the external
//! writer needs for the method's `.limit stack` directive; `current_depth`
//! is the net unconsumed stack effect of the fragment's code.

use crate::emit::Label;
use crate::ty::StaticType;

/// Generated instruction text plus operand-stack depth accounting.
///
/// Invariant: `max_stack_depth >= current_depth` at all times.
/// `current_depth` never goes negative; an over-consume clamps to zero,
/// which signals an accounting bug in the generator rather than corrupting
/// downstream arithmetic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyFragment {
    /// Generated instruction text, one instruction or label per line
    pub code: String,
    /// Net unconsumed stack effect of this fragment's code
    pub current_depth: usize,
    /// High-water mark of the operand stack across this fragment
    pub max_stack_depth: usize,
    /// Static type of the value the fragment leaves on the stack
    pub ty: StaticType,
}

impl AssemblyFragment {
    /// Create an empty fragment with no stack effect.
    pub fn new() -> Self {
        Self {
            code: String::new(),
            current_depth: 0,
            max_stack_depth: 0,
            ty: StaticType::Unknown,
        }
    }

    /// Record that the code just emitted pushes `depth_needed` slots.
    pub fn update_depth(&mut self, depth_needed: usize) {
        self.current_depth += depth_needed;
        if self.current_depth > self.max_stack_depth {
            self.max_stack_depth = self.current_depth;
        }
    }

    /// Record that the code just emitted consumes `depth_used` slots.
    ///
    /// Clamps at zero instead of underflowing.
    pub fn consume(&mut self, depth_used: usize) {
        if depth_used <= self.current_depth {
            self.current_depth -= depth_used;
        } else {
            self.current_depth = 0;
        }
    }

    /// Append a child fragment: concatenate its code and fold its depth
    /// profile into this one. The child's high-water mark is observed on
    /// top of the stack this fragment has already left behind. Takes over
    /// the child's result type.
    pub fn absorb(&mut self, child: AssemblyFragment) {
        let reach = self.current_depth + child.max_stack_depth;
        if reach > self.max_stack_depth {
            self.max_stack_depth = reach;
        }
        self.current_depth += child.current_depth;
        self.code.push_str(&child.code);
        self.ty = child.ty;
    }

    /// Append one instruction line.
    pub fn push_instruction(&mut self, instruction: &str) {
        self.code.push_str(instruction);
        self.code.push('\n');
    }

    /// Place a label at the current position.
    pub fn push_label(&mut self, label: Label) {
        self.code.push_str(&format!("{}:\n", label));
    }

    /// Append a jump instruction targeting `label`.
    pub fn push_jump(&mut self, instruction: &str, label: Label) {
        self.code.push_str(&format!("{} {}\n", instruction, label));
    }

    /// Append an `invokestatic` call.
    pub fn push_invoke_static(&mut self, owner: &str, method: &str, descriptor: &str) {
        self.code
            .push_str(&format!("invokestatic {}/{}{}\n", owner, method, descriptor));
    }

    /// Append an `invokevirtual` call.
    pub fn push_invoke_virtual(&mut self, owner: &str, method: &str, descriptor: &str) {
        self.code
            .push_str(&format!("invokevirtual {}/{}{}\n", owner, method, descriptor));
    }
}

impl Default for AssemblyFragment {
    fn default() -> Self {
        Self::new()
    }
}
