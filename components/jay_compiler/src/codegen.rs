//! Code generation - walks the AST and emits stack-machine assembly.
//!
//! One recursive visitor over statements, one over expressions, mutually
//! recursive, each an exhaustive `match` over the node enum. The generator
//! owns the scope environment, the label counter, and the local-variable
//! debug table; nothing is global, so repeated compilations in one process
//! are independent.
//!
//! Instruction selection is type-directed: the static type recorded on each
//! fragment decides between numeric, string, and boolean lowering. Static
//! type violations and unresolved names are fatal - generation aborts with
//! a [`CompileError`] carrying operator, operand types, and line context.

use crate::ast::{Ast, Expr, ExprId, Stmt, StmtId};
use crate::scope::Environment;
use crate::token::TokenKind;
use jay_asm::{format_number, quote_string, AssemblyFragment, Label, StaticType};
use jay_core::{CompileError, LiteralValue};

/// The only callable builtin: a static call into the host runtime.
const INTEROP_BUILTIN: &str = "JavaStaticCall";

/// Tree-walking code generator for one compilation unit.
pub struct CodeGenerator<'a> {
    ast: &'a Ast,
    environment: Environment,
    label_counter: usize,
    local_variable_table: String,
}

impl<'a> CodeGenerator<'a> {
    /// Create a generator over a parsed arena.
    pub fn new(ast: &'a Ast) -> Self {
        Self {
            ast,
            environment: Environment::new(),
            label_counter: 0,
            local_variable_table: String::new(),
        }
    }

    /// Generate assembly for the given statements.
    ///
    /// Returns the combined fragment; its `max_stack_depth` is the operand
    /// stack size the external writer must reserve.
    pub fn generate(&mut self, statements: &[StmtId]) -> Result<AssemblyFragment, CompileError> {
        let mut fragment = AssemblyFragment::new();
        for &statement in statements {
            let child = self.generate_statement(statement)?;
            fragment.absorb(child);
        }
        Ok(fragment)
    }

    /// The accumulated local-variable debug table, one
    /// `<slot> is <name> <descriptor> from L<a> to L<b>` line per record,
    /// for the external writer's `.localvariabletable` directive.
    pub fn local_variable_table(&self) -> &str {
        &self.local_variable_table
    }

    /// Number of local slots the generated code addresses.
    pub fn slots_used(&self) -> usize {
        self.environment.slots_used()
    }

    // --- statements ---

    fn generate_statement(&mut self, id: StmtId) -> Result<AssemblyFragment, CompileError> {
        let ast = self.ast;
        match ast.statement(id) {
            Stmt::Expression { expression } => self.generate_expression(*expression),

            Stmt::Print { expression } => self.generate_print(*expression),

            Stmt::Var { name, initializer } => {
                let mut fragment = match initializer {
                    Some(expression) => self.generate_expression(*expression)?,
                    None => {
                        let mut fragment = AssemblyFragment::new();
                        fragment.push_instruction("aconst_null");
                        fragment.update_depth(1);
                        fragment.ty = StaticType::Null;
                        fragment
                    }
                };

                let slot = self.environment.define(&name.lexeme, fragment.ty, name.line)?;
                let ty = fragment.ty;
                emit_store(&mut fragment, slot, ty);

                let start = self.next_label();
                let end = self.next_label();
                self.record_debug_range(slot, &name.lexeme, ty, start, end);

                Ok(fragment)
            }

            Stmt::Block { statements } => {
                self.environment.enter_child();
                let result = self.generate_block(statements);
                // the pop must happen on the error path as well
                self.environment.exit_to_parent();
                result
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let mut fragment = self.generate_expression(*condition)?;
                let else_label = self.next_label();
                let end_label = self.next_label();

                fragment.push_jump("ifeq", else_label);
                fragment.consume(1);

                let then_fragment = self.generate_statement(*then_branch)?;
                fragment.absorb(then_fragment);
                fragment.push_jump("goto", end_label);

                fragment.push_label(else_label);
                if let Some(else_branch) = else_branch {
                    let else_fragment = self.generate_statement(*else_branch)?;
                    fragment.absorb(else_fragment);
                }
                fragment.push_label(end_label);

                Ok(fragment)
            }

            Stmt::While { condition, body } => {
                let mut fragment = AssemblyFragment::new();
                let condition_label = self.next_label();
                let end_label = self.next_label();

                fragment.push_label(condition_label);
                let condition_fragment = self.generate_expression(*condition)?;
                fragment.absorb(condition_fragment);
                fragment.push_jump("ifeq", end_label);
                fragment.consume(1);

                let body_fragment = self.generate_statement(*body)?;
                fragment.absorb(body_fragment);
                fragment.push_jump("goto", condition_label);
                fragment.push_label(end_label);

                Ok(fragment)
            }
        }
    }

    fn generate_block(&mut self, statements: &[StmtId]) -> Result<AssemblyFragment, CompileError> {
        let mut fragment = AssemblyFragment::new();
        let start = self.next_label();
        let end = self.next_label();

        fragment.push_label(start);
        for &statement in statements {
            let child = self.generate_statement(statement)?;
            fragment.absorb(child);
        }

        // names declared in this block live from the start label to the end
        // label
        let ranges: Vec<(usize, String, StaticType)> = self
            .environment
            .current_symbols()
            .into_iter()
            .map(|symbol| (symbol.slot, symbol.name.clone(), symbol.ty))
            .collect();
        for (slot, name, ty) in ranges {
            self.record_debug_range(slot, &name, ty, start, end);
        }

        fragment.push_label(end);
        Ok(fragment)
    }

    fn generate_print(&mut self, expression: ExprId) -> Result<AssemblyFragment, CompileError> {
        let mut fragment = AssemblyFragment::new();
        fragment.push_instruction("getstatic java/lang/System/out Ljava/io/PrintStream;");
        fragment.update_depth(1);

        let value = self.generate_expression(expression)?;
        let value_ty = value.ty;
        fragment.absorb(value);

        // convert to text unless the value already is text
        match value_ty {
            StaticType::Double => {
                fragment.push_invoke_static("java/lang/String", "valueOf", "(D)Ljava/lang/String;");
                fragment.consume(2);
                fragment.update_depth(1);
            }
            StaticType::Bool => {
                fragment.push_invoke_static("java/lang/String", "valueOf", "(Z)Ljava/lang/String;");
                fragment.consume(1);
                fragment.update_depth(1);
            }
            StaticType::Null | StaticType::Unknown => {
                fragment.push_invoke_static(
                    "java/lang/String",
                    "valueOf",
                    "(Ljava/lang/Object;)Ljava/lang/String;",
                );
                fragment.consume(1);
                fragment.update_depth(1);
            }
            StaticType::String => {}
        }

        fragment.push_invoke_virtual("java/io/PrintStream", "println", "(Ljava/lang/String;)V");
        fragment.consume(2);
        fragment.ty = StaticType::Unknown;
        Ok(fragment)
    }

    // --- expressions ---

    fn generate_expression(&mut self, id: ExprId) -> Result<AssemblyFragment, CompileError> {
        let ast = self.ast;
        match ast.expression(id) {
            Expr::Literal { value } => Ok(generate_literal(value)),

            Expr::Grouping { expression } => self.generate_expression(*expression),

            Expr::Unary { operator, operand } => {
                let mut fragment = self.generate_expression(*operand)?;
                match operator.kind {
                    TokenKind::Minus => {
                        if !fragment.ty.is_numeric() {
                            return Err(CompileError::OperandType {
                                operator: operator.lexeme.clone(),
                                expected: "number".to_string(),
                                found: fragment.ty.describe().to_string(),
                                line: operator.line,
                            });
                        }
                        fragment.push_instruction("dneg");
                        fragment.ty = StaticType::Double;
                    }
                    TokenKind::Bang => {
                        if fragment.ty != StaticType::Bool {
                            return Err(CompileError::OperandType {
                                operator: operator.lexeme.clone(),
                                expected: "boolean".to_string(),
                                found: fragment.ty.describe().to_string(),
                                line: operator.line,
                            });
                        }
                        fragment.push_instruction("iconst_1");
                        fragment.update_depth(1);
                        fragment.push_instruction("ixor");
                        fragment.consume(1);
                        fragment.ty = StaticType::Bool;
                    }
                    _ => {
                        return Err(CompileError::Internal {
                            message: format!("unexpected unary operator '{}'", operator.lexeme),
                        })
                    }
                }
                Ok(fragment)
            }

            Expr::Binary {
                left,
                operator,
                right,
            } => {
                let left_fragment = self.generate_expression(*left)?;
                let right_fragment = self.generate_expression(*right)?;
                self.generate_binary(left_fragment, operator.kind, &operator.lexeme, operator.line, right_fragment)
            }

            Expr::Logical {
                left,
                operator,
                right,
            } => {
                // both operands are always evaluated; `and`/`or` lower to
                // bitwise ops on the two booleans
                let left_fragment = self.generate_expression(*left)?;
                let right_fragment = self.generate_expression(*right)?;

                if left_fragment.ty != StaticType::Bool || right_fragment.ty != StaticType::Bool {
                    return Err(CompileError::OperandTypes {
                        operator: operator.lexeme.clone(),
                        left: left_fragment.ty.describe().to_string(),
                        right: right_fragment.ty.describe().to_string(),
                        line: operator.line,
                    });
                }

                let mut fragment = AssemblyFragment::new();
                fragment.absorb(left_fragment);
                fragment.absorb(right_fragment);
                let instruction = if operator.kind == TokenKind::And {
                    "iand"
                } else {
                    "ior"
                };
                fragment.push_instruction(instruction);
                fragment.consume(1);
                fragment.ty = StaticType::Bool;
                Ok(fragment)
            }

            Expr::Ternary {
                condition,
                then_branch,
                else_branch,
                line,
            } => {
                let condition_fragment = self.generate_expression(*condition)?;
                let then_fragment = self.generate_expression(*then_branch)?;
                let else_fragment = self.generate_expression(*else_branch)?;

                if then_fragment.ty != else_fragment.ty {
                    return Err(CompileError::OperandTypes {
                        operator: "?:".to_string(),
                        left: then_fragment.ty.describe().to_string(),
                        right: else_fragment.ty.describe().to_string(),
                        line: *line,
                    });
                }
                let result_ty = then_fragment.ty;

                let else_label = self.next_label();
                let end_label = self.next_label();

                let mut fragment = AssemblyFragment::new();
                fragment.absorb(condition_fragment);
                fragment.push_jump("ifeq", else_label);
                fragment.consume(1);

                fragment.absorb(then_fragment);
                fragment.push_jump("goto", end_label);
                fragment.push_label(else_label);

                // only one arm executes; the net depth counts a single
                // result
                let else_net = else_fragment.current_depth;
                fragment.absorb(else_fragment);
                fragment.consume(else_net);
                fragment.push_label(end_label);

                fragment.ty = result_ty;
                Ok(fragment)
            }

            Expr::Variable { name } => {
                let symbol = self.environment.lookup(&name.lexeme).ok_or_else(|| {
                    CompileError::UndefinedVariable {
                        name: name.lexeme.clone(),
                        line: name.line,
                    }
                })?;
                let (slot, ty) = (symbol.slot, symbol.ty);

                let mut fragment = AssemblyFragment::new();
                emit_load(&mut fragment, slot, ty);
                Ok(fragment)
            }

            Expr::Assign { name, value } => {
                let mut fragment = self.generate_expression(*value)?;
                let ty = fragment.ty;
                let slot = self.environment.assign(&name.lexeme, ty, name.line)?;
                emit_store(&mut fragment, slot, ty);
                Ok(fragment)
            }

            Expr::Call {
                callee,
                arguments,
                line,
            } => match ast.expression(*callee) {
                Expr::Variable { name } if name.lexeme == INTEROP_BUILTIN => {
                    self.generate_interop_call(arguments, *line)
                }
                Expr::Variable { name } => Err(CompileError::UnknownCallable {
                    callee: name.lexeme.clone(),
                    line: *line,
                }),
                _ => Err(CompileError::InvalidCall {
                    message: "only named built-in functions can be called".to_string(),
                    line: *line,
                }),
            },
        }
    }

    fn generate_binary(
        &mut self,
        left: AssemblyFragment,
        operator: TokenKind,
        lexeme: &str,
        line: u32,
        right: AssemblyFragment,
    ) -> Result<AssemblyFragment, CompileError> {
        let (left_ty, right_ty) = (left.ty, right.ty);
        let operand_error = |left_ty: StaticType, right_ty: StaticType| CompileError::OperandTypes {
            operator: lexeme.to_string(),
            left: left_ty.describe().to_string(),
            right: right_ty.describe().to_string(),
            line,
        };

        match operator {
            TokenKind::Plus => {
                if left_ty.is_numeric() && right_ty.is_numeric() {
                    let mut fragment = AssemblyFragment::new();
                    fragment.absorb(left);
                    fragment.absorb(right);
                    fragment.push_instruction("dadd");
                    fragment.consume(2);
                    fragment.ty = StaticType::Double;
                    Ok(fragment)
                } else if left_ty.is_textual() || right_ty.is_textual() {
                    // string concatenation; the non-string side is
                    // stringified right after its own code
                    let mut fragment = AssemblyFragment::new();
                    fragment.absorb(left);
                    if !left_ty.is_textual() {
                        stringify(&mut fragment, left_ty);
                    }
                    fragment.absorb(right);
                    if !right_ty.is_textual() {
                        stringify(&mut fragment, right_ty);
                    }
                    fragment.push_invoke_virtual(
                        "java/lang/String",
                        "concat",
                        "(Ljava/lang/String;)Ljava/lang/String;",
                    );
                    fragment.consume(1);
                    fragment.ty = StaticType::String;
                    Ok(fragment)
                } else {
                    Err(operand_error(left_ty, right_ty))
                }
            }

            TokenKind::Minus | TokenKind::Star | TokenKind::Slash => {
                if !left_ty.is_numeric() || !right_ty.is_numeric() {
                    return Err(operand_error(left_ty, right_ty));
                }
                let instruction = match operator {
                    TokenKind::Minus => "dsub",
                    TokenKind::Star => "dmul",
                    _ => "ddiv",
                };
                let mut fragment = AssemblyFragment::new();
                fragment.absorb(left);
                fragment.absorb(right);
                fragment.push_instruction(instruction);
                fragment.consume(2);
                fragment.ty = StaticType::Double;
                Ok(fragment)
            }

            TokenKind::Greater
            | TokenKind::GreaterEqual
            | TokenKind::Less
            | TokenKind::LessEqual => {
                if !left_ty.is_numeric() || !right_ty.is_numeric() {
                    return Err(operand_error(left_ty, right_ty));
                }
                let branch = match operator {
                    TokenKind::Greater => "ifgt",
                    TokenKind::GreaterEqual => "ifge",
                    TokenKind::Less => "iflt",
                    _ => "ifle",
                };
                let mut fragment = AssemblyFragment::new();
                fragment.absorb(left);
                fragment.absorb(right);
                fragment.push_instruction("dcmpg");
                fragment.consume(3);
                self.emit_branch_result(&mut fragment, branch, 1);
                Ok(fragment)
            }

            TokenKind::EqualEqual | TokenKind::BangEqual => {
                let negated = operator == TokenKind::BangEqual;
                if left_ty.is_numeric() && right_ty.is_numeric() {
                    let mut fragment = AssemblyFragment::new();
                    fragment.absorb(left);
                    fragment.absorb(right);
                    fragment.push_instruction("dcmpg");
                    fragment.consume(3);
                    let branch = if negated { "ifne" } else { "ifeq" };
                    self.emit_branch_result(&mut fragment, branch, 1);
                    Ok(fragment)
                } else if left_ty.is_textual() && right_ty.is_textual() {
                    // the target runtime offers a direct comparison call
                    let mut fragment = AssemblyFragment::new();
                    fragment.absorb(left);
                    fragment.absorb(right);
                    fragment.push_invoke_virtual(
                        "java/lang/String",
                        "equals",
                        "(Ljava/lang/Object;)Z",
                    );
                    fragment.consume(1);
                    if negated {
                        fragment.push_instruction("iconst_1");
                        fragment.update_depth(1);
                        fragment.push_instruction("ixor");
                        fragment.consume(1);
                    }
                    fragment.ty = StaticType::Bool;
                    Ok(fragment)
                } else if left_ty == StaticType::Bool && right_ty == StaticType::Bool {
                    let mut fragment = AssemblyFragment::new();
                    fragment.absorb(left);
                    fragment.absorb(right);
                    let branch = if negated { "if_icmpne" } else { "if_icmpeq" };
                    self.emit_branch_result(&mut fragment, branch, 2);
                    Ok(fragment)
                } else {
                    Err(operand_error(left_ty, right_ty))
                }
            }

            _ => Err(CompileError::Internal {
                message: format!("unexpected binary operator '{}'", lexeme),
            }),
        }
    }

    /// Emit the compare-and-branch idiom that leaves a single boolean:
    /// branch to a true label, push false, branch over a push-true,
    /// converge at a shared label.
    fn emit_branch_result(
        &mut self,
        fragment: &mut AssemblyFragment,
        branch: &str,
        operands: usize,
    ) {
        let true_label = self.next_label();
        let end_label = self.next_label();

        fragment.push_jump(branch, true_label);
        fragment.consume(operands);
        fragment.push_instruction("iconst_0");
        fragment.push_jump("goto", end_label);
        fragment.push_label(true_label);
        fragment.push_instruction("iconst_1");
        fragment.push_label(end_label);

        // both arms leave exactly one boolean
        fragment.update_depth(1);
        fragment.ty = StaticType::Bool;
    }

    fn generate_interop_call(
        &mut self,
        arguments: &[ExprId],
        line: u32,
    ) -> Result<AssemblyFragment, CompileError> {
        if arguments.len() < 2 {
            return Err(CompileError::InvalidCall {
                message: format!(
                    "{} requires at least a class name and a method name",
                    INTEROP_BUILTIN
                ),
                line,
            });
        }

        let class_name = self.string_literal_argument(arguments[0], "class name", line)?;
        let method_name = self.string_literal_argument(arguments[1], "method name", line)?;

        let mut fragment = AssemblyFragment::new();
        let passed = &arguments[2..];
        for &argument in passed {
            let argument_fragment = self.generate_expression(argument)?;
            let argument_ty = argument_fragment.ty;
            fragment.absorb(argument_fragment);
            // primitives cross the interop boundary boxed
            match argument_ty {
                StaticType::Double => {
                    fragment.push_invoke_static(
                        "java/lang/Double",
                        "valueOf",
                        "(D)Ljava/lang/Double;",
                    );
                    fragment.consume(2);
                    fragment.update_depth(1);
                }
                StaticType::Bool => {
                    fragment.push_invoke_static(
                        "java/lang/Boolean",
                        "valueOf",
                        "(Z)Ljava/lang/Boolean;",
                    );
                    fragment.consume(1);
                    fragment.update_depth(1);
                }
                StaticType::String | StaticType::Null | StaticType::Unknown => {}
            }
        }

        let mut descriptor = String::from("(");
        for _ in passed {
            descriptor.push_str("Ljava/lang/Object;");
        }
        descriptor.push_str(")Ljava/lang/Object;");
        fragment.push_invoke_static(&class_name, &method_name, &descriptor);
        fragment.consume(passed.len());
        fragment.update_depth(1);

        fragment.push_invoke_static(
            "java/lang/String",
            "valueOf",
            "(Ljava/lang/Object;)Ljava/lang/String;",
        );
        fragment.consume(1);
        fragment.update_depth(1);
        fragment.ty = StaticType::String;
        Ok(fragment)
    }

    fn string_literal_argument(
        &self,
        argument: ExprId,
        what: &str,
        line: u32,
    ) -> Result<String, CompileError> {
        match self.ast.expression(argument) {
            Expr::Literal {
                value: LiteralValue::String(value),
            } => Ok(value.clone()),
            _ => Err(CompileError::InvalidCall {
                message: format!("{} {} must be a string literal", INTEROP_BUILTIN, what),
                line,
            }),
        }
    }

    fn next_label(&mut self) -> Label {
        let label = Label(self.label_counter);
        self.label_counter += 1;
        label
    }

    fn record_debug_range(
        &mut self,
        slot: usize,
        name: &str,
        ty: StaticType,
        start: Label,
        end: Label,
    ) {
        self.local_variable_table.push_str(&format!(
            "{} is {} {} from {} to {}\n",
            slot,
            name,
            ty.descriptor(),
            start,
            end
        ));
    }
}

fn generate_literal(value: &LiteralValue) -> AssemblyFragment {
    let mut fragment = AssemblyFragment::new();
    match value {
        LiteralValue::Number(n) => {
            fragment.push_instruction(&format!("ldc2_w {}", format_number(*n)));
            fragment.update_depth(2);
            fragment.ty = StaticType::Double;
        }
        LiteralValue::String(s) => {
            fragment.push_instruction(&format!("ldc {}", quote_string(s)));
            fragment.update_depth(1);
            fragment.ty = StaticType::String;
        }
        LiteralValue::Bool(b) => {
            fragment.push_instruction(if *b { "iconst_1" } else { "iconst_0" });
            fragment.update_depth(1);
            fragment.ty = StaticType::Bool;
        }
        LiteralValue::Null => {
            fragment.push_instruction("aconst_null");
            fragment.update_depth(1);
            fragment.ty = StaticType::Null;
        }
    }
    fragment
}

/// Convert the value on top of the stack to a string, by its static type.
fn stringify(fragment: &mut AssemblyFragment, ty: StaticType) {
    match ty {
        StaticType::Double => {
            fragment.push_invoke_static("java/lang/String", "valueOf", "(D)Ljava/lang/String;");
            fragment.consume(2);
            fragment.update_depth(1);
        }
        StaticType::Bool => {
            fragment.push_invoke_static("java/lang/String", "valueOf", "(Z)Ljava/lang/String;");
            fragment.consume(1);
            fragment.update_depth(1);
        }
        StaticType::Null | StaticType::Unknown => {
            fragment.push_invoke_static(
                "java/lang/String",
                "valueOf",
                "(Ljava/lang/Object;)Ljava/lang/String;",
            );
            fragment.consume(1);
            fragment.update_depth(1);
        }
        StaticType::String => {}
    }
}

fn emit_load(fragment: &mut AssemblyFragment, slot: usize, ty: StaticType) {
    match ty {
        StaticType::Double => {
            fragment.push_instruction(&format!("dload {}", slot));
            fragment.update_depth(2);
        }
        StaticType::Bool => {
            fragment.push_instruction(&format!("iload {}", slot));
            fragment.update_depth(1);
        }
        StaticType::String | StaticType::Null | StaticType::Unknown => {
            fragment.push_instruction(&format!("aload {}", slot));
            fragment.update_depth(1);
        }
    }
    fragment.ty = ty;
}

fn emit_store(fragment: &mut AssemblyFragment, slot: usize, ty: StaticType) {
    match ty {
        StaticType::Double => {
            fragment.push_instruction(&format!("dstore {}", slot));
            fragment.consume(2);
        }
        StaticType::Bool => {
            fragment.push_instruction(&format!("istore {}", slot));
            fragment.consume(1);
        }
        StaticType::String | StaticType::Null | StaticType::Unknown => {
            fragment.push_instruction(&format!("astore {}", slot));
            fragment.consume(1);
        }
    }
}
