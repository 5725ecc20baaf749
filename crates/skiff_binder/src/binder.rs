//! The binder: resolves names, types, operators and conversions.
//!
//! Binding happens in two phases. `bind_global_scope` takes the syntax
//! trees of one submission plus the scope of the previous submission
//! and produces declared symbols and bound top-level statements, in
//! member order: package clauses, imports, then every function
//! signature, then global statements. `bind_function_body` binds one
//! declared function's body against the scope chain of the submission
//! that declared it.

use std::sync::Arc;

use skiff_core::{SourceText, TextSpan};
use skiff_diagnostics::{messages, DiagnosticCollection, DiagnosticMessage};
use skiff_symbols::{
    builtins, FunctionSymbol, HostRegistry, PackageSymbol, ParameterSymbol, TypeSymbol, Value,
    VariableSymbol,
};
use skiff_syntax::{
    AccessorExpressionSyntax, AssignmentExpressionSyntax, BinaryExpressionSyntax,
    BlockStatementSyntax, BreakStatementSyntax, CallExpressionSyntax, ContinueStatementSyntax,
    ExpressionSyntax, ForStatementSyntax, FunctionDeclarationSyntax, IfStatementSyntax,
    ImportDeclarationSyntax, LiteralExpressionSyntax, MemberSyntax, NameExpressionSyntax,
    RangeForStatementSyntax, ReturnStatementSyntax, StatementSyntax, SyntaxKind, SyntaxToken,
    SyntaxTree, TypeClauseSyntax, UnaryExpressionSyntax, VariableDeclarationSyntax,
};

use crate::conversion::Conversion;
use crate::node::{
    BoundAssignmentExpression, BoundBinaryExpression, BoundBlockStatement, BoundCallExpression,
    BoundConversionExpression, BoundExpression, BoundExpressionStatement, BoundForStatement,
    BoundGotoStatement, BoundIfStatement, BoundImportedCallExpression, BoundLabel,
    BoundLiteralExpression, BoundRangeForStatement, BoundReturnStatement, BoundStatement,
    BoundUnaryExpression, BoundVariableDeclaration, BoundVariableExpression,
};
use crate::operators::{BoundBinaryOperator, BoundUnaryOperator};
use crate::program::BoundGlobalScope;
use crate::scope::{BoundScope, Symbol};

/// Package name used when no `package` clause appears.
pub const DEFAULT_PACKAGE_NAME: &str = "main";

pub struct Binder {
    scope: BoundScope,
    diagnostics: DiagnosticCollection,
    /// The function whose body is being bound, if any.
    function: Option<FunctionSymbol>,
    /// Innermost-last stack of (break, continue) jump targets.
    loop_stack: Vec<(BoundLabel, BoundLabel)>,
    label_counter: u32,
    /// Packages visible via `import`. Deliberately not part of the scope
    /// chain: a variable may shadow a package name without breaking
    /// `package.function(...)` calls.
    imports: Vec<PackageSymbol>,
    /// Source of the tree currently being bound; attached to diagnostics.
    source: Option<Arc<SourceText>>,
}

impl Binder {
    fn new(parent: BoundScope, function: Option<FunctionSymbol>) -> Self {
        let mut scope = BoundScope::with_parent(parent);
        if let Some(function) = &function {
            for parameter in function.parameters() {
                scope.try_declare_variable(parameter.as_variable().clone());
            }
        }
        Self {
            scope,
            diagnostics: DiagnosticCollection::new(),
            function,
            loop_stack: Vec::new(),
            label_counter: 0,
            imports: Vec::new(),
            source: None,
        }
    }

    // ========================================================================
    // Entry points
    // ========================================================================

    /// Bind the top level of a submission: declare its symbols and bind its
    /// global statements against the chain of previous submissions.
    pub fn bind_global_scope(
        previous: Option<Arc<BoundGlobalScope>>,
        syntax_trees: &[SyntaxTree],
        host: &HostRegistry,
    ) -> BoundGlobalScope {
        let parent = create_parent_scope(previous.clone());
        let mut binder = Binder::new(parent, None);
        binder.imports = previous
            .as_ref()
            .map(|scope| scope.packages.clone())
            .unwrap_or_default();

        // The package clause: the first one names the unit, later ones
        // are errors.
        let mut package_name: Option<String> = None;
        for tree in syntax_trees {
            binder.source = Some(Arc::clone(tree.source()));
            for member in tree.members() {
                if let MemberSyntax::Package(clause) = member {
                    if clause.identifier.is_missing {
                        continue;
                    }
                    if package_name.is_none() {
                        package_name = Some(clause.identifier.text.clone());
                    } else {
                        binder.report(clause.span(), &messages::PACKAGE_NAME_ALREADY_DECLARED, &[]);
                    }
                }
            }
        }

        for tree in syntax_trees {
            binder.source = Some(Arc::clone(tree.source()));
            for member in tree.members() {
                if let MemberSyntax::Import(import) = member {
                    binder.bind_import_declaration(import, host);
                }
            }
        }

        // All signatures are declared before any body or statement is
        // bound, so call sites may precede declarations.
        for tree in syntax_trees {
            binder.source = Some(Arc::clone(tree.source()));
            for member in tree.members() {
                if let MemberSyntax::Function(declaration) = member {
                    binder.bind_function_declaration(declaration);
                }
            }
        }

        let mut statements = Vec::new();
        for tree in syntax_trees {
            binder.source = Some(Arc::clone(tree.source()));
            for member in tree.members() {
                if let MemberSyntax::GlobalStatement(statement) = member {
                    statements.push(binder.bind_statement(statement));
                }
            }
        }

        let functions = binder.scope.declared_functions();
        let variables = binder.scope.declared_variables();

        let mut diagnostics = Vec::new();
        if let Some(previous) = &previous {
            diagnostics.extend(previous.diagnostics.iter().cloned());
        }
        diagnostics.extend(binder.diagnostics.into_diagnostics());

        BoundGlobalScope {
            previous,
            package_name: package_name.unwrap_or_else(|| DEFAULT_PACKAGE_NAME.to_string()),
            diagnostics,
            packages: binder.imports,
            functions,
            variables,
            statements,
        }
    }

    /// Bind one declared function's body. The scope chain is rebuilt as it
    /// was when `unit` was bound, so the body sees exactly the symbols it
    /// saw at declaration time.
    pub fn bind_function_body(
        unit: &Arc<BoundGlobalScope>,
        function: &FunctionSymbol,
    ) -> (Arc<BoundStatement>, DiagnosticCollection) {
        let parent = create_parent_scope(Some(Arc::clone(unit)));
        let mut binder = Binder::new(parent, Some(function.clone()));
        binder.imports = unit.packages.clone();
        binder.source = function.source().cloned();
        let body = match function.declaration() {
            Some(declaration) => binder.bind_block_statement(&declaration.body),
            None => Arc::new(BoundStatement::Block(BoundBlockStatement {
                statements: Vec::new(),
            })),
        };
        (body, binder.diagnostics)
    }

    // ========================================================================
    // Members
    // ========================================================================

    fn bind_import_declaration(&mut self, syntax: &ImportDeclarationSyntax, host: &HostRegistry) {
        if syntax.identifier.is_missing {
            return;
        }
        let name = &syntax.identifier.text;
        // Importing the same package twice is a no-op.
        if self.imports.iter().any(|package| package.name() == name) {
            return;
        }
        match host.resolve(name) {
            Some(package) => self.imports.push(package.clone()),
            None => {
                self.report(syntax.identifier.span, &messages::UNDEFINED_PACKAGE_0, &[name]);
            }
        }
    }

    fn bind_function_declaration(&mut self, syntax: &Arc<FunctionDeclarationSyntax>) {
        let mut parameters: Vec<ParameterSymbol> = Vec::new();
        for parameter in &syntax.parameters {
            let name = parameter.identifier.text.clone();
            let ty = self.bind_type_clause(&parameter.type_clause);
            if parameters.iter().any(|p| p.name() == name) {
                self.report(
                    parameter.span(),
                    &messages::PARAMETER_ALREADY_DECLARED_0,
                    &[&name],
                );
            } else {
                parameters.push(ParameterSymbol::new(name, ty));
            }
        }

        let return_type = match &syntax.type_clause {
            Some(clause) => self.bind_type_clause(clause),
            None => TypeSymbol::Void,
        };

        if syntax.identifier.is_missing {
            return;
        }
        let source = match &self.source {
            Some(source) => Arc::clone(source),
            None => Arc::new(SourceText::new(String::new())),
        };
        let function = FunctionSymbol::with_declaration(
            syntax.identifier.text.clone(),
            parameters,
            return_type,
            Arc::clone(syntax),
            source,
        );
        if !self.scope.try_declare_function(function) {
            self.report(
                syntax.identifier.span,
                &messages::SYMBOL_ALREADY_DECLARED_0,
                &[&syntax.identifier.text],
            );
        }
    }

    fn bind_type_clause(&mut self, syntax: &TypeClauseSyntax) -> TypeSymbol {
        if syntax.identifier.is_missing {
            // The parser already complained about the missing name.
            return TypeSymbol::Error;
        }
        match TypeSymbol::lookup(&syntax.identifier.text) {
            Some(ty) => ty,
            None => {
                self.report(
                    syntax.identifier.span,
                    &messages::UNDEFINED_TYPE_0,
                    &[&syntax.identifier.text],
                );
                TypeSymbol::Error
            }
        }
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn bind_statement(&mut self, syntax: &StatementSyntax) -> Arc<BoundStatement> {
        match syntax {
            StatementSyntax::Block(block) => self.bind_block_statement(block),
            StatementSyntax::VariableDeclaration(declaration) => {
                self.bind_variable_declaration(declaration)
            }
            StatementSyntax::If(statement) => self.bind_if_statement(statement),
            StatementSyntax::For(statement) => self.bind_for_statement(statement),
            StatementSyntax::RangeFor(statement) => self.bind_range_for_statement(statement),
            StatementSyntax::Break(statement) => self.bind_break_statement(statement),
            StatementSyntax::Continue(statement) => self.bind_continue_statement(statement),
            StatementSyntax::Return(statement) => self.bind_return_statement(statement),
            StatementSyntax::Expression(statement) => {
                let expression = self.bind_expression(&statement.expression, true);
                Arc::new(BoundStatement::Expression(BoundExpressionStatement {
                    expression,
                }))
            }
        }
    }

    fn bind_block_statement(&mut self, syntax: &BlockStatementSyntax) -> Arc<BoundStatement> {
        self.push_scope();
        let statements = syntax
            .statements
            .iter()
            .map(|statement| self.bind_statement(statement))
            .collect();
        self.pop_scope();
        Arc::new(BoundStatement::Block(BoundBlockStatement { statements }))
    }

    fn bind_variable_declaration(
        &mut self,
        syntax: &VariableDeclarationSyntax,
    ) -> Arc<BoundStatement> {
        let initializer = self.bind_expression(&syntax.initializer, false);
        let variable =
            self.declare_variable(&syntax.identifier, syntax.is_read_only(), initializer.ty());
        Arc::new(BoundStatement::VariableDeclaration(BoundVariableDeclaration {
            variable,
            initializer,
        }))
    }

    fn bind_if_statement(&mut self, syntax: &IfStatementSyntax) -> Arc<BoundStatement> {
        let condition = self.bind_expression_to(&syntax.condition, TypeSymbol::Bool);
        let then_statement = self.bind_statement(&syntax.then_statement);
        let else_statement = syntax
            .else_clause
            .as_ref()
            .map(|clause| self.bind_statement(&clause.statement));
        Arc::new(BoundStatement::If(BoundIfStatement {
            condition,
            then_statement,
            else_statement,
        }))
    }

    fn bind_for_statement(&mut self, syntax: &ForStatementSyntax) -> Arc<BoundStatement> {
        let (body, break_label, continue_label) = self.bind_loop_body(&syntax.body);
        Arc::new(BoundStatement::For(BoundForStatement {
            body,
            break_label,
            continue_label,
        }))
    }

    fn bind_range_for_statement(&mut self, syntax: &RangeForStatementSyntax) -> Arc<BoundStatement> {
        let lower_bound = self.bind_expression_to(&syntax.lower_bound, TypeSymbol::Int);
        let upper_bound = self.bind_expression_to(&syntax.upper_bound, TypeSymbol::Int);

        self.push_scope();
        let variable = self.declare_variable(&syntax.identifier, true, TypeSymbol::Int);
        let (body, break_label, continue_label) = self.bind_loop_body(&syntax.body);
        self.pop_scope();

        Arc::new(BoundStatement::RangeFor(BoundRangeForStatement {
            variable,
            lower_bound,
            upper_bound,
            body,
            break_label,
            continue_label,
        }))
    }

    fn bind_loop_body(
        &mut self,
        body: &BlockStatementSyntax,
    ) -> (Arc<BoundStatement>, BoundLabel, BoundLabel) {
        self.label_counter += 1;
        let break_label = BoundLabel::new(format!("break{}", self.label_counter));
        let continue_label = BoundLabel::new(format!("continue{}", self.label_counter));

        self.loop_stack.push((break_label.clone(), continue_label.clone()));
        let body = self.bind_block_statement(body);
        self.loop_stack.pop();

        (body, break_label, continue_label)
    }

    fn bind_break_statement(&mut self, syntax: &BreakStatementSyntax) -> Arc<BoundStatement> {
        match self.loop_stack.last() {
            Some((break_label, _)) => Arc::new(BoundStatement::Goto(BoundGotoStatement {
                label: break_label.clone(),
            })),
            None => {
                self.report(
                    syntax.keyword.span,
                    &messages::INVALID_BREAK_OR_CONTINUE_0,
                    &[&syntax.keyword.text],
                );
                self.bind_error_statement()
            }
        }
    }

    fn bind_continue_statement(&mut self, syntax: &ContinueStatementSyntax) -> Arc<BoundStatement> {
        match self.loop_stack.last() {
            Some((_, continue_label)) => Arc::new(BoundStatement::Goto(BoundGotoStatement {
                label: continue_label.clone(),
            })),
            None => {
                self.report(
                    syntax.keyword.span,
                    &messages::INVALID_BREAK_OR_CONTINUE_0,
                    &[&syntax.keyword.text],
                );
                self.bind_error_statement()
            }
        }
    }

    fn bind_return_statement(&mut self, syntax: &ReturnStatementSyntax) -> Arc<BoundStatement> {
        let mut expression = syntax
            .expression
            .as_ref()
            .map(|expression| self.bind_expression(expression, false));

        match self.function.clone() {
            // A top-level return: any value, or none, is fine. The
            // evaluator stops and yields it.
            None => {}
            Some(function) if function.return_type() == TypeSymbol::Void => {
                if expression.is_some() {
                    let span = syntax
                        .expression
                        .as_ref()
                        .map(|expression| expression.span())
                        .unwrap_or(syntax.keyword.span);
                    self.report(span, &messages::INVALID_RETURN_EXPRESSION_0, &[function.name()]);
                }
            }
            Some(function) => match (&syntax.expression, expression.take()) {
                (Some(expression_syntax), Some(bound)) => {
                    expression = Some(self.bind_conversion(
                        expression_syntax.span(),
                        bound,
                        function.return_type(),
                        false,
                    ));
                }
                _ => {
                    self.report(
                        syntax.keyword.span,
                        &messages::MISSING_RETURN_EXPRESSION_0,
                        &[function.return_type().name()],
                    );
                }
            },
        }

        Arc::new(BoundStatement::Return(BoundReturnStatement { expression }))
    }

    fn bind_error_statement(&mut self) -> Arc<BoundStatement> {
        Arc::new(BoundStatement::Expression(BoundExpressionStatement {
            expression: Arc::new(BoundExpression::Error),
        }))
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn bind_expression(&mut self, syntax: &ExpressionSyntax, can_be_void: bool) -> Arc<BoundExpression> {
        let result = self.bind_expression_internal(syntax);
        if !can_be_void && result.ty() == TypeSymbol::Void {
            self.report(syntax.span(), &messages::EXPRESSION_MUST_HAVE_VALUE, &[]);
            return Arc::new(BoundExpression::Error);
        }
        result
    }

    /// Bind an expression and convert it to `ty`, reporting a diagnostic
    /// if no implicit conversion exists.
    fn bind_expression_to(&mut self, syntax: &ExpressionSyntax, ty: TypeSymbol) -> Arc<BoundExpression> {
        let expression = self.bind_expression(syntax, false);
        self.bind_conversion(syntax.span(), expression, ty, false)
    }

    fn bind_expression_internal(&mut self, syntax: &ExpressionSyntax) -> Arc<BoundExpression> {
        match syntax {
            ExpressionSyntax::Literal(literal) => self.bind_literal_expression(literal),
            ExpressionSyntax::Name(name) => self.bind_name_expression(name),
            ExpressionSyntax::Unary(unary) => self.bind_unary_expression(unary),
            ExpressionSyntax::Binary(binary) => self.bind_binary_expression(binary),
            ExpressionSyntax::Parenthesized(parenthesized) => {
                self.bind_expression_internal(&parenthesized.expression)
            }
            ExpressionSyntax::Assignment(assignment) => self.bind_assignment_expression(assignment),
            ExpressionSyntax::Call(call) => self.bind_call_expression(call),
            ExpressionSyntax::Accessor(accessor) => self.bind_accessor_expression(accessor),
        }
    }

    fn bind_literal_expression(&mut self, syntax: &LiteralExpressionSyntax) -> Arc<BoundExpression> {
        let value = match syntax.token.kind {
            SyntaxKind::IntToken => Value::Int(syntax.token.int_value()),
            SyntaxKind::StringToken => Value::from(syntax.token.string_value()),
            SyntaxKind::TrueKeyword => Value::Bool(true),
            SyntaxKind::FalseKeyword => Value::Bool(false),
            _ => Value::Int(0),
        };
        Arc::new(BoundExpression::Literal(BoundLiteralExpression { value }))
    }

    fn bind_name_expression(&mut self, syntax: &NameExpressionSyntax) -> Arc<BoundExpression> {
        if syntax.identifier.is_missing {
            // The parser inserted this token; it already reported the error.
            return Arc::new(BoundExpression::Error);
        }
        match self.bind_variable_reference(&syntax.identifier) {
            Some(variable) => Arc::new(BoundExpression::Variable(BoundVariableExpression {
                variable,
            })),
            None => Arc::new(BoundExpression::Error),
        }
    }

    fn bind_unary_expression(&mut self, syntax: &UnaryExpressionSyntax) -> Arc<BoundExpression> {
        let operand = self.bind_expression(&syntax.operand, false);
        if operand.ty().is_error() {
            return Arc::new(BoundExpression::Error);
        }
        match BoundUnaryOperator::bind(syntax.operator.kind, operand.ty()) {
            Some(operator) => Arc::new(BoundExpression::Unary(BoundUnaryExpression {
                operator,
                operand,
            })),
            None => {
                self.report(
                    syntax.operator.span,
                    &messages::UNDEFINED_UNARY_OPERATOR_0_FOR_1,
                    &[&syntax.operator.text, operand.ty().name()],
                );
                Arc::new(BoundExpression::Error)
            }
        }
    }

    fn bind_binary_expression(&mut self, syntax: &BinaryExpressionSyntax) -> Arc<BoundExpression> {
        let left = self.bind_expression(&syntax.left, false);
        let right = self.bind_expression(&syntax.right, false);
        if left.ty().is_error() || right.ty().is_error() {
            return Arc::new(BoundExpression::Error);
        }
        match BoundBinaryOperator::bind(syntax.operator.kind, left.ty(), right.ty()) {
            Some(operator) => Arc::new(BoundExpression::Binary(BoundBinaryExpression {
                left,
                operator,
                right,
            })),
            None => {
                self.report(
                    syntax.operator.span,
                    &messages::UNDEFINED_BINARY_OPERATOR_0_FOR_1_AND_2,
                    &[&syntax.operator.text, left.ty().name(), right.ty().name()],
                );
                Arc::new(BoundExpression::Error)
            }
        }
    }

    fn bind_assignment_expression(
        &mut self,
        syntax: &AssignmentExpressionSyntax,
    ) -> Arc<BoundExpression> {
        let expression = self.bind_expression(&syntax.expression, false);
        let Some(variable) = self.bind_variable_reference(&syntax.identifier) else {
            return expression;
        };
        if variable.is_read_only() {
            self.report(
                syntax.equals.span,
                &messages::VARIABLE_0_IS_READ_ONLY,
                &[variable.name()],
            );
        }
        let expression =
            self.bind_conversion(syntax.expression.span(), expression, variable.ty(), false);
        Arc::new(BoundExpression::Assignment(BoundAssignmentExpression {
            variable,
            expression,
        }))
    }

    fn bind_call_expression(&mut self, syntax: &CallExpressionSyntax) -> Arc<BoundExpression> {
        // A one-argument call to a type name is the cast form.
        if syntax.arguments.len() == 1 {
            if let Some(ty) = TypeSymbol::lookup(&syntax.identifier.text) {
                return self.bind_cast(&syntax.arguments[0], ty);
            }
        }

        if syntax.identifier.is_missing {
            return Arc::new(BoundExpression::Error);
        }

        let arguments: Vec<Arc<BoundExpression>> = syntax
            .arguments
            .iter()
            .map(|argument| self.bind_expression(argument, false))
            .collect();

        let symbol = self.scope.lookup(&syntax.identifier.text).cloned();
        let function = match symbol {
            None => {
                self.report(
                    syntax.identifier.span,
                    &messages::UNDEFINED_FUNCTION_0,
                    &[&syntax.identifier.text],
                );
                return Arc::new(BoundExpression::Error);
            }
            Some(Symbol::Function(function)) => function,
            Some(_) => {
                self.report(
                    syntax.identifier.span,
                    &messages::NOT_A_FUNCTION_0,
                    &[&syntax.identifier.text],
                );
                return Arc::new(BoundExpression::Error);
            }
        };

        // An arity mismatch preempts the per-argument checks.
        if syntax.arguments.len() != function.parameters().len() {
            let span = if syntax.arguments.len() > function.parameters().len() {
                let first_excess = &syntax.arguments[function.parameters().len()];
                let last = &syntax.arguments[syntax.arguments.len() - 1];
                TextSpan::from_bounds(first_excess.span().start, last.span().end())
            } else {
                syntax.close_paren.span
            };
            self.report(
                span,
                &messages::WRONG_ARGUMENT_COUNT_0_EXPECTS_1_GOT_2,
                &[
                    function.name(),
                    &function.parameters().len().to_string(),
                    &syntax.arguments.len().to_string(),
                ],
            );
            return Arc::new(BoundExpression::Error);
        }

        let arguments = arguments
            .into_iter()
            .zip(function.parameters().iter())
            .zip(syntax.arguments.iter())
            .map(|((argument, parameter), argument_syntax)| {
                self.bind_conversion(argument_syntax.span(), argument, parameter.ty(), false)
            })
            .collect();

        Arc::new(BoundExpression::Call(BoundCallExpression {
            function,
            arguments,
        }))
    }

    fn bind_accessor_expression(
        &mut self,
        syntax: &AccessorExpressionSyntax,
    ) -> Arc<BoundExpression> {
        if syntax.target.is_missing || syntax.member.is_missing {
            return Arc::new(BoundExpression::Error);
        }
        let package_name = &syntax.target.text;
        let member_name = &syntax.member.text;

        let Some(invocation) = &syntax.invocation else {
            self.report(
                syntax.span(),
                &messages::MEMBER_ACCESS_NOT_SUPPORTED_0_1,
                &[package_name, member_name],
            );
            return Arc::new(BoundExpression::Error);
        };

        let package = self
            .imports
            .iter()
            .find(|package| package.name() == package_name)
            .cloned();
        let Some(package) = package else {
            self.report(
                syntax.target.span,
                &messages::PACKAGE_0_NOT_IMPORTED,
                &[package_name],
            );
            return Arc::new(BoundExpression::Error);
        };

        let Some(function) = package.function(member_name).cloned() else {
            self.report(
                syntax.member.span,
                &messages::PACKAGE_0_HAS_NO_FUNCTION_1,
                &[package_name, member_name],
            );
            return Arc::new(BoundExpression::Error);
        };

        let arguments: Vec<Arc<BoundExpression>> = invocation
            .arguments
            .iter()
            .map(|argument| self.bind_expression(argument, false))
            .collect();
        let argument_types: Vec<TypeSymbol> =
            arguments.iter().map(|argument| argument.ty()).collect();
        if argument_types.iter().any(|ty| ty.is_error()) {
            return Arc::new(BoundExpression::Error);
        }

        let Some(signature) = function.find_signature(&argument_types).cloned() else {
            let type_list = argument_types
                .iter()
                .map(|ty| ty.name())
                .collect::<Vec<_>>()
                .join(", ");
            self.report(
                syntax.span(),
                &messages::NO_OVERLOAD_OF_0_1_MATCHES_2,
                &[package_name, member_name, &type_list],
            );
            return Arc::new(BoundExpression::Error);
        };

        Arc::new(BoundExpression::ImportedCall(BoundImportedCallExpression {
            package,
            function,
            signature,
            arguments,
        }))
    }

    // ========================================================================
    // Conversions
    // ========================================================================

    /// Bind the cast form `type(expression)`: explicit conversions allowed.
    fn bind_cast(&mut self, syntax: &ExpressionSyntax, ty: TypeSymbol) -> Arc<BoundExpression> {
        let expression = self.bind_expression(syntax, false);
        self.bind_conversion(syntax.span(), expression, ty, true)
    }

    fn bind_conversion(
        &mut self,
        span: TextSpan,
        expression: Arc<BoundExpression>,
        ty: TypeSymbol,
        allow_explicit: bool,
    ) -> Arc<BoundExpression> {
        let conversion = Conversion::classify(expression.ty(), ty);
        if !conversion.exists {
            if !expression.ty().is_error() && !ty.is_error() {
                self.report(
                    span,
                    &messages::CANNOT_CONVERT_0_TO_1,
                    &[expression.ty().name(), ty.name()],
                );
            }
            return Arc::new(BoundExpression::Error);
        }
        if !allow_explicit && conversion.is_explicit() {
            self.report(
                span,
                &messages::CANNOT_CONVERT_0_TO_1_IMPLICITLY,
                &[expression.ty().name(), ty.name()],
            );
        }
        if conversion.is_identity {
            return expression;
        }
        Arc::new(BoundExpression::Conversion(BoundConversionExpression {
            ty,
            expression,
        }))
    }

    // ========================================================================
    // Symbol helpers
    // ========================================================================

    /// Declare a variable in the current scope. At the top level variables
    /// are globals; inside a function they live in its frame.
    fn declare_variable(
        &mut self,
        identifier: &SyntaxToken,
        is_read_only: bool,
        ty: TypeSymbol,
    ) -> VariableSymbol {
        let name = if identifier.is_missing {
            "?".to_string()
        } else {
            identifier.text.clone()
        };
        let variable = if self.function.is_none() {
            VariableSymbol::global(name.clone(), is_read_only, ty)
        } else {
            VariableSymbol::local(name.clone(), is_read_only, ty)
        };
        if !identifier.is_missing && !self.scope.try_declare_variable(variable.clone()) {
            self.report(identifier.span, &messages::SYMBOL_ALREADY_DECLARED_0, &[&name]);
        }
        variable
    }

    fn bind_variable_reference(&mut self, identifier: &SyntaxToken) -> Option<VariableSymbol> {
        let name = &identifier.text;
        match self.scope.lookup(name).cloned() {
            Some(Symbol::Variable(variable)) => Some(variable),
            Some(_) => {
                self.report(identifier.span, &messages::NOT_A_VARIABLE_0, &[name]);
                None
            }
            None => {
                self.report(identifier.span, &messages::UNDEFINED_VARIABLE_0, &[name]);
                None
            }
        }
    }

    fn push_scope(&mut self) {
        let current = std::mem::take(&mut self.scope);
        self.scope = BoundScope::with_parent(current);
    }

    fn pop_scope(&mut self) {
        self.scope = self.scope.take_parent();
    }

    fn report(&mut self, span: TextSpan, message: &DiagnosticMessage, args: &[&str]) {
        let mut diagnostic = skiff_diagnostics::Diagnostic::new(span, message, args);
        if let Some(file) = self.source.as_ref().and_then(|source| source.file_name()) {
            diagnostic = diagnostic.with_file(file);
        }
        self.diagnostics.add(diagnostic);
    }
}

/// Rebuild the scope chain for a submission: builtins at the root, then
/// one scope per previous submission, oldest first, re-declaring the
/// symbols it contributed.
fn create_parent_scope(previous: Option<Arc<BoundGlobalScope>>) -> BoundScope {
    let mut submissions = Vec::new();
    let mut current = previous;
    while let Some(scope) = current {
        current = scope.previous.clone();
        submissions.push(scope);
    }

    let mut result = create_root_scope();
    while let Some(submission) = submissions.pop() {
        let mut scope = BoundScope::with_parent(result);
        for function in &submission.functions {
            scope.try_declare_function(function.clone());
        }
        for variable in &submission.variables {
            scope.try_declare_variable(variable.clone());
        }
        result = scope;
    }
    result
}

fn create_root_scope() -> BoundScope {
    let mut root = BoundScope::new();
    for builtin in builtins::all() {
        root.try_declare_function(builtin);
    }
    root
}
