//! Lexical scope environment - name resolution and slot allocation.
//!
//! Scopes are kept as an explicit stack of owned frames: entering a block
//! pushes a frame, leaving pops it, so exiting restores exactly the prior
//! state on every path. Slot indices come from one monotonically increasing
//! counter owned by the instance and are never reused within a compilation
//! unit; symbols in a popped frame become unreachable but their slots stay
//! dead.

use jay_asm::StaticType;
use jay_core::CompileError;
use std::collections::HashMap;

/// A resolved name: its recorded static type and storage slot.
///
/// Immutable once inserted except for `ty`, which is refreshed when the
/// variable is reassigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    /// The declared name
    pub name: String,
    /// The most recently recorded static type of the stored value
    pub ty: StaticType,
    /// Storage slot index, unique across the compilation unit
    pub slot: usize,
}

#[derive(Debug, Default)]
struct ScopeFrame {
    symbols: HashMap<String, Symbol>,
}

/// The scope chain used during code generation.
#[derive(Debug)]
pub struct Environment {
    frames: Vec<ScopeFrame>,
    next_slot: usize,
}

impl Environment {
    /// Create an environment holding only the root scope.
    pub fn new() -> Self {
        Self {
            frames: vec![ScopeFrame::default()],
            next_slot: 0,
        }
    }

    /// Declare `name` in the current scope with the given initial type.
    ///
    /// Returns the allocated slot index. Declaring a name that already
    /// exists in the current scope is a [`CompileError::Redefinition`];
    /// shadowing a name from an enclosing scope is legal.
    pub fn define(
        &mut self,
        name: &str,
        ty: StaticType,
        line: u32,
    ) -> Result<usize, CompileError> {
        let frame = self
            .frames
            .last_mut()
            .expect("environment always has a root frame");

        if frame.symbols.contains_key(name) {
            return Err(CompileError::Redefinition {
                name: name.to_string(),
                line,
            });
        }

        let slot = self.next_slot;
        self.next_slot += 1;
        frame.symbols.insert(
            name.to_string(),
            Symbol {
                name: name.to_string(),
                ty,
                slot,
            },
        );
        Ok(slot)
    }

    /// Resolve `name`, searching the current scope then each ancestor.
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.symbols.get(name))
    }

    /// Reassign `name`: refresh the recorded type of the nearest visible
    /// symbol and return its slot. Assigning an undeclared name is a
    /// [`CompileError::UndefinedVariable`].
    pub fn assign(
        &mut self,
        name: &str,
        ty: StaticType,
        line: u32,
    ) -> Result<usize, CompileError> {
        for frame in self.frames.iter_mut().rev() {
            if let Some(symbol) = frame.symbols.get_mut(name) {
                symbol.ty = ty;
                return Ok(symbol.slot);
            }
        }
        Err(CompileError::UndefinedVariable {
            name: name.to_string(),
            line,
        })
    }

    /// Enter a nested scope.
    pub fn enter_child(&mut self) {
        self.frames.push(ScopeFrame::default());
    }

    /// Leave the current scope, releasing its symbols. The root scope is
    /// never popped.
    pub fn exit_to_parent(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    /// Symbols declared in the current scope, ordered by slot.
    pub fn current_symbols(&self) -> Vec<&Symbol> {
        let frame = self
            .frames
            .last()
            .expect("environment always has a root frame");
        let mut symbols: Vec<&Symbol> = frame.symbols.values().collect();
        symbols.sort_by_key(|symbol| symbol.slot);
        symbols
    }

    /// Nesting depth (1 = root scope only).
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Number of slots allocated so far; the high-water mark for the
    /// method's locals area.
    pub fn slots_used(&self) -> usize {
        self.next_slot
    }

    /// Reset to a single empty root scope for a fresh compilation unit.
    pub fn clear(&mut self) {
        self.frames.clear();
        self.frames.push(ScopeFrame::default());
        self.next_slot = 0;
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
