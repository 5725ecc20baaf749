//! Execution of lowered programs.
//!
//! A block is executed with a program counter over its flat statement
//! list; a jump table maps each label to the index just past it. The
//! evaluator keeps one global store for the whole session and a stack
//! of frames for function calls, with a base frame that is always
//! present. Dispatch follows the static types the binder recorded, not
//! the runtime values.

use std::io::{self, BufRead};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use rustc_hash::FxHashMap;

use skiff_binder::node::{
    BoundBinaryExpression, BoundBlockStatement, BoundCallExpression, BoundConversionExpression,
    BoundExpression, BoundImportedCallExpression, BoundLabel, BoundStatement,
    BoundUnaryExpression,
};
use skiff_binder::operators::{BoundBinaryOperatorKind, BoundUnaryOperatorKind};
use skiff_binder::program::BoundProgram;
use skiff_symbols::{builtins, TypeSymbol, Value, VariableKind, VariableSymbol};

use crate::fault::EvaluatorFault;

/// Variable stores are keyed by symbol identity, so shadowed variables
/// with the same name never collide.
pub type Variables = FxHashMap<VariableSymbol, Value>;

/// Walks a lowered program. Globals live in a caller-owned store so a
/// session can evaluate many programs against the same state.
pub struct Evaluator<'a> {
    program: &'a BoundProgram,
    globals: &'a mut Variables,
    locals: Vec<Variables>,
    last_value: Value,
    rng_state: u64,
}

impl<'a> Evaluator<'a> {
    pub fn new(program: &'a BoundProgram, variables: &'a mut Variables) -> Self {
        Self {
            program,
            globals: variables,
            // The base frame backs top-level code outside any call.
            locals: vec![Variables::default()],
            last_value: Value::Unit,
            rng_state: clock_seed(),
        }
    }

    /// Runs the program's top-level statements. The result is the value
    /// of the last expression statement, or `Unit` when there is none.
    pub fn evaluate(mut self) -> Result<Value, EvaluatorFault> {
        let statement = Arc::clone(&self.program.statement);
        self.evaluate_block(&statement)
    }

    fn evaluate_block(&mut self, block: &BoundBlockStatement) -> Result<Value, EvaluatorFault> {
        // Jumping to a label resumes right after it.
        let mut label_to_index: FxHashMap<&BoundLabel, usize> = FxHashMap::default();
        for (index, statement) in block.statements.iter().enumerate() {
            if let BoundStatement::Label(statement) = statement.as_ref() {
                label_to_index.insert(&statement.label, index + 1);
            }
        }

        let mut index = 0;
        while index < block.statements.len() {
            let statement = &block.statements[index];
            match statement.as_ref() {
                BoundStatement::VariableDeclaration(declaration) => {
                    let value = self.evaluate_expression(&declaration.initializer)?;
                    self.last_value = value.clone();
                    self.assign(&declaration.variable, value);
                    index += 1;
                }
                BoundStatement::Expression(statement) => {
                    self.last_value = self.evaluate_expression(&statement.expression)?;
                    index += 1;
                }
                BoundStatement::Goto(statement) => {
                    index = jump_target(&label_to_index, &statement.label)?;
                }
                BoundStatement::ConditionalGoto(statement) => {
                    let condition = self.evaluate_expression(&statement.condition)?;
                    if expect_bool(&condition)? == statement.jump_if_true {
                        index = jump_target(&label_to_index, &statement.label)?;
                    } else {
                        index += 1;
                    }
                }
                BoundStatement::Label(_) => {
                    index += 1;
                }
                BoundStatement::Return(statement) => {
                    return match &statement.expression {
                        Some(expression) => self.evaluate_expression(expression),
                        None => Ok(Value::Unit),
                    };
                }
                _ => {
                    return Err(EvaluatorFault::UnexpectedStatement {
                        statement: Arc::clone(statement),
                    })
                }
            }
        }
        // Falling off the end of a body yields the last observed value.
        Ok(self.last_value.clone())
    }

    fn evaluate_expression(
        &mut self,
        expression: &Arc<BoundExpression>,
    ) -> Result<Value, EvaluatorFault> {
        match expression.as_ref() {
            BoundExpression::Literal(node) => Ok(node.value.clone()),
            BoundExpression::Variable(node) => self.lookup(&node.variable),
            BoundExpression::Assignment(node) => {
                let value = self.evaluate_expression(&node.expression)?;
                self.assign(&node.variable, value.clone());
                Ok(value)
            }
            BoundExpression::Unary(node) => self.evaluate_unary(node),
            BoundExpression::Binary(node) => self.evaluate_binary(node),
            BoundExpression::Call(node) => self.evaluate_call(node),
            BoundExpression::ImportedCall(node) => self.evaluate_imported_call(node),
            BoundExpression::Conversion(node) => self.evaluate_conversion(node),
            BoundExpression::Error => Err(EvaluatorFault::UnexpectedExpression {
                expression: Arc::clone(expression),
            }),
        }
    }

    fn evaluate_unary(&mut self, node: &BoundUnaryExpression) -> Result<Value, EvaluatorFault> {
        let operand = self.evaluate_expression(&node.operand)?;
        match node.operator.kind {
            BoundUnaryOperatorKind::Identity => Ok(Value::Int(expect_int(&operand)?)),
            BoundUnaryOperatorKind::Negation => {
                Ok(Value::Int(expect_int(&operand)?.wrapping_neg()))
            }
            BoundUnaryOperatorKind::LogicalNegation => Ok(Value::Bool(!expect_bool(&operand)?)),
            BoundUnaryOperatorKind::OnesComplement => Ok(Value::Int(!expect_int(&operand)?)),
        }
    }

    fn evaluate_binary(&mut self, node: &BoundBinaryExpression) -> Result<Value, EvaluatorFault> {
        // Both operands are always evaluated; `&&` and `||` do not
        // short-circuit.
        let left = self.evaluate_expression(&node.left)?;
        let right = self.evaluate_expression(&node.right)?;
        match node.operator.kind {
            BoundBinaryOperatorKind::Addition => {
                if node.operator.left_type == TypeSymbol::String {
                    let text = format!("{}{}", expect_str(&left)?, expect_str(&right)?);
                    Ok(Value::from(text))
                } else {
                    Ok(Value::Int(
                        expect_int(&left)?.wrapping_add(expect_int(&right)?),
                    ))
                }
            }
            BoundBinaryOperatorKind::Subtraction => Ok(Value::Int(
                expect_int(&left)?.wrapping_sub(expect_int(&right)?),
            )),
            BoundBinaryOperatorKind::Multiplication => Ok(Value::Int(
                expect_int(&left)?.wrapping_mul(expect_int(&right)?),
            )),
            BoundBinaryOperatorKind::Division => {
                let divisor = expect_int(&right)?;
                if divisor == 0 {
                    return Err(EvaluatorFault::DivisionByZero);
                }
                Ok(Value::Int(expect_int(&left)?.wrapping_div(divisor)))
            }
            BoundBinaryOperatorKind::Remainder => {
                let divisor = expect_int(&right)?;
                if divisor == 0 {
                    return Err(EvaluatorFault::DivisionByZero);
                }
                Ok(Value::Int(expect_int(&left)?.wrapping_rem(divisor)))
            }
            BoundBinaryOperatorKind::LogicalAnd => {
                Ok(Value::Bool(expect_bool(&left)? && expect_bool(&right)?))
            }
            BoundBinaryOperatorKind::LogicalOr => {
                Ok(Value::Bool(expect_bool(&left)? || expect_bool(&right)?))
            }
            BoundBinaryOperatorKind::BitwiseAnd => {
                if node.operator.left_type == TypeSymbol::Bool {
                    Ok(Value::Bool(expect_bool(&left)? & expect_bool(&right)?))
                } else {
                    Ok(Value::Int(expect_int(&left)? & expect_int(&right)?))
                }
            }
            BoundBinaryOperatorKind::BitwiseOr => {
                if node.operator.left_type == TypeSymbol::Bool {
                    Ok(Value::Bool(expect_bool(&left)? | expect_bool(&right)?))
                } else {
                    Ok(Value::Int(expect_int(&left)? | expect_int(&right)?))
                }
            }
            BoundBinaryOperatorKind::BitwiseXor => {
                if node.operator.left_type == TypeSymbol::Bool {
                    Ok(Value::Bool(expect_bool(&left)? ^ expect_bool(&right)?))
                } else {
                    Ok(Value::Int(expect_int(&left)? ^ expect_int(&right)?))
                }
            }
            BoundBinaryOperatorKind::Equals => Ok(Value::Bool(left == right)),
            BoundBinaryOperatorKind::NotEquals => Ok(Value::Bool(left != right)),
            BoundBinaryOperatorKind::Less => {
                Ok(Value::Bool(expect_int(&left)? < expect_int(&right)?))
            }
            BoundBinaryOperatorKind::LessOrEquals => {
                Ok(Value::Bool(expect_int(&left)? <= expect_int(&right)?))
            }
            BoundBinaryOperatorKind::Greater => {
                Ok(Value::Bool(expect_int(&left)? > expect_int(&right)?))
            }
            BoundBinaryOperatorKind::GreaterOrEquals => {
                Ok(Value::Bool(expect_int(&left)? >= expect_int(&right)?))
            }
        }
    }

    fn evaluate_call(&mut self, node: &BoundCallExpression) -> Result<Value, EvaluatorFault> {
        if node.function == builtins::input() {
            let mut line = String::new();
            let _ = io::stdin().lock().read_line(&mut line);
            let line = line.trim_end_matches(['\n', '\r']);
            return Ok(Value::from(line.to_string()));
        }
        if node.function == builtins::print() {
            let value = self.evaluate_expression(&node.arguments[0])?;
            println!("{}", expect_str(&value)?);
            return Ok(Value::Unit);
        }
        if node.function == builtins::rnd() {
            let value = self.evaluate_expression(&node.arguments[0])?;
            let max = expect_int(&value)?;
            return Ok(Value::Int(self.next_random(max)));
        }

        let program = self.program;
        let Some(body) = program.functions.get(&node.function) else {
            return Err(EvaluatorFault::MissingBody {
                name: node.function.name().to_string(),
            });
        };
        let mut frame = Variables::default();
        for (parameter, argument) in node.function.parameters().iter().zip(&node.arguments) {
            let value = self.evaluate_expression(argument)?;
            frame.insert(parameter.as_variable().clone(), value);
        }
        self.locals.push(frame);
        let result = self.evaluate_block(body);
        self.locals.pop();
        result
    }

    fn evaluate_imported_call(
        &mut self,
        node: &BoundImportedCallExpression,
    ) -> Result<Value, EvaluatorFault> {
        let mut arguments = Vec::with_capacity(node.arguments.len());
        for argument in &node.arguments {
            arguments.push(self.evaluate_expression(argument)?);
        }
        Ok((node.signature.callback)(&arguments))
    }

    fn evaluate_conversion(
        &mut self,
        node: &BoundConversionExpression,
    ) -> Result<Value, EvaluatorFault> {
        let value = self.evaluate_expression(&node.expression)?;
        match node.ty {
            TypeSymbol::Bool => {
                match value.as_string() {
                    Some("true") => return Ok(Value::Bool(true)),
                    Some("false") => return Ok(Value::Bool(false)),
                    _ => {}
                }
                Err(EvaluatorFault::InvalidCast {
                    value,
                    target: TypeSymbol::Bool,
                })
            }
            TypeSymbol::Int => {
                if let Some(parsed) = value.as_string().and_then(|s| s.trim().parse().ok()) {
                    return Ok(Value::Int(parsed));
                }
                Err(EvaluatorFault::InvalidCast {
                    value,
                    target: TypeSymbol::Int,
                })
            }
            TypeSymbol::String => Ok(Value::from(value.to_string())),
            target => Err(EvaluatorFault::InvalidCast { value, target }),
        }
    }

    fn lookup(&self, variable: &VariableSymbol) -> Result<Value, EvaluatorFault> {
        let value = match variable.kind() {
            VariableKind::Global => self.globals.get(variable),
            _ => self.locals.last().and_then(|frame| frame.get(variable)),
        };
        value
            .cloned()
            .ok_or_else(|| EvaluatorFault::UndefinedVariable {
                name: variable.name().to_string(),
            })
    }

    fn assign(&mut self, variable: &VariableSymbol, value: Value) {
        if variable.kind() == VariableKind::Global {
            self.globals.insert(variable.clone(), value);
        } else if let Some(frame) = self.locals.last_mut() {
            frame.insert(variable.clone(), value);
        }
    }

    /// xorshift64; good enough for `rnd` and free of dependencies.
    fn next_random(&mut self, max: i64) -> i64 {
        let mut x = self.rng_state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.rng_state = x;
        if max <= 0 {
            return 0;
        }
        (x % max as u64) as i64
    }
}

fn jump_target(
    labels: &FxHashMap<&BoundLabel, usize>,
    label: &BoundLabel,
) -> Result<usize, EvaluatorFault> {
    labels
        .get(label)
        .copied()
        .ok_or_else(|| EvaluatorFault::MissingLabel {
            label: label.clone(),
        })
}

fn clock_seed() -> u64 {
    // The low bit is forced so the xorshift state is never zero.
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(elapsed) => elapsed.as_nanos() as u64 | 1,
        Err(_) => 0x9e37_79b9_7f4a_7c15,
    }
}

fn expect_int(value: &Value) -> Result<i64, EvaluatorFault> {
    value.as_int().ok_or(EvaluatorFault::TypeMismatch {
        expected: TypeSymbol::Int,
    })
}

fn expect_bool(value: &Value) -> Result<bool, EvaluatorFault> {
    value.as_bool().ok_or(EvaluatorFault::TypeMismatch {
        expected: TypeSymbol::Bool,
    })
}

fn expect_str(value: &Value) -> Result<&str, EvaluatorFault> {
    value.as_string().ok_or(EvaluatorFault::TypeMismatch {
        expected: TypeSymbol::String,
    })
}
