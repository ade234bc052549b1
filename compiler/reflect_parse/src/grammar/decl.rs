//! Declaration parsing: package header, imports, classes, functions and
//! properties.
//!
//! Declarations are pushed into the unit's table as they are parsed. A
//! class is pushed before its body so nested declarations can name it as
//! their parent; its constructor count is patched once the body is done.

use reflect_diagnostic::ErrorCode;
use reflect_ir::{
    Annotation, AnnotationArg, AnnotationValue, CallArg, CompilationUnit, DeclFlags, DeclId,
    DeclKind, Declaration, ExprKind, Import, Member, Name, Param, Span, TypeRef,
};
use smallvec::SmallVec;
use tracing::trace;

use crate::error::{ErrorContext, ParseError};
use crate::lexer::TokenKind;
use crate::Parser;

/// Annotations and modifiers preceding a declaration keyword.
struct Header {
    annotations: Vec<Annotation>,
    flags: DeclFlags,
    start: Span,
}

impl Parser<'_> {
    /// Parse a whole source file.
    pub(crate) fn parse_unit(mut self) -> (CompilationUnit, Vec<ParseError>) {
        self.cursor.skip_separators();
        if self.cursor.check(TokenKind::Package) {
            match self.parse_package() {
                Ok(path) => self.unit.package = path,
                Err(e) => {
                    self.errors.push(e.in_context(ErrorContext::Unit));
                    self.recover_to_declaration();
                }
            }
        }

        loop {
            self.cursor.skip_separators();
            if !self.cursor.check(TokenKind::Import) {
                break;
            }
            match self.parse_import() {
                Ok(import) => self.unit.imports.push(import),
                Err(e) => {
                    self.errors.push(e.in_context(ErrorContext::Import));
                    self.recover_to_declaration();
                }
            }
        }

        loop {
            self.cursor.skip_separators();
            if self.cursor.is_at_end() {
                break;
            }
            if self.cursor.check(TokenKind::RBrace) {
                let span = self.cursor.advance().span;
                self.errors.push(ParseError::new(
                    ErrorCode::E1001,
                    "unmatched `}`",
                    span,
                ));
                continue;
            }
            if let Err(e) = self.parse_declaration(None) {
                self.errors.push(e);
                self.recover_to_declaration();
            }
        }

        (self.unit, self.errors)
    }

    fn parse_package(&mut self) -> Result<Vec<Name>, ParseError> {
        self.cursor.expect(TokenKind::Package)?;
        self.parse_dotted_path()
    }

    fn parse_import(&mut self) -> Result<Import, ParseError> {
        let start = self.cursor.expect(TokenKind::Import)?.span;
        let mut path = self.parse_dotted_path()?;
        if self.cursor.check(TokenKind::Dot) && self.cursor.peek_next_kind() == TokenKind::Star {
            self.cursor.advance();
            self.cursor.advance();
            path.push(self.interner().intern("*"));
        }
        // `import a.B as C`
        if self.cursor.eat(TokenKind::As) {
            self.cursor.expect_ident()?;
        }
        Ok(Import {
            path,
            span: start.merge(self.cursor.previous_span()),
        })
    }

    fn parse_dotted_path(&mut self) -> Result<Vec<Name>, ParseError> {
        let mut path = vec![self.cursor.expect_ident()?];
        while self.cursor.check(TokenKind::Dot)
            && matches!(self.cursor.peek_next_kind(), TokenKind::Ident(_))
        {
            self.cursor.advance();
            path.push(self.cursor.expect_ident()?);
        }
        Ok(path)
    }

    /// Parse one declaration, pushing it (and anything nested) into the
    /// table. Returns `None` for members that are not declarations of their
    /// own (`init` blocks, secondary constructors).
    pub(crate) fn parse_declaration(
        &mut self,
        parent: Option<DeclId>,
    ) -> Result<Option<DeclId>, ParseError> {
        let header = self.parse_header()?;
        match self.cursor.current_kind() {
            TokenKind::Class | TokenKind::Interface | TokenKind::Object => self
                .parse_class(header, parent)
                .map(Some)
                .map_err(|e| e.in_context(ErrorContext::ClassDecl)),
            TokenKind::Fun => self
                .parse_function(header, parent)
                .map(Some)
                .map_err(|e| e.in_context(ErrorContext::FunctionDecl)),
            TokenKind::Val | TokenKind::Var => self
                .parse_property(header, parent)
                .map(Some)
                .map_err(|e| e.in_context(ErrorContext::PropertyDecl)),
            TokenKind::Constructor if parent.is_some() => {
                self.skip_secondary_constructor()?;
                if let Some(parent) = parent {
                    self.unit.decls.get_mut(parent).constructors += 1;
                }
                Ok(None)
            }
            TokenKind::Ident(name) if name == self.kw.init && parent.is_some() => {
                self.cursor.advance();
                self.skip_balanced_braces()?;
                Ok(None)
            }
            found => Err(ParseError::expected(
                ErrorCode::E1001,
                "declaration",
                found,
                self.cursor.current_span(),
            )),
        }
    }

    fn parse_header(&mut self) -> Result<Header, ParseError> {
        let start = self.cursor.current_span();
        let mut annotations = Vec::new();
        while self.cursor.check(TokenKind::At) {
            let annotation = self
                .parse_annotation()
                .map_err(|e| e.in_context(ErrorContext::Annotation))?;
            annotations.push(annotation);
            self.cursor.skip_newlines();
        }

        let mut flags = DeclFlags::empty();
        while let TokenKind::Ident(name) = self.cursor.current_kind() {
            if !self.kw.is_modifier(name) {
                break;
            }
            let next = self.cursor.peek_next_kind();
            if !matches!(
                next,
                TokenKind::Ident(_)
                    | TokenKind::Class
                    | TokenKind::Interface
                    | TokenKind::Object
                    | TokenKind::Fun
                    | TokenKind::Val
                    | TokenKind::Var
                    | TokenKind::Constructor
            ) {
                break;
            }
            flags |= self.modifier_flag(name);
            self.cursor.advance();
        }
        Ok(Header {
            annotations,
            flags,
            start,
        })
    }

    fn modifier_flag(&self, name: Name) -> DeclFlags {
        if name == self.kw.data {
            DeclFlags::DATA
        } else if name == self.kw.sealed {
            DeclFlags::SEALED
        } else if name == self.kw.abstract_ {
            DeclFlags::ABSTRACT
        } else if name == self.kw.open {
            DeclFlags::OPEN
        } else if name == self.kw.enum_ {
            DeclFlags::ENUM
        } else if name == self.kw.companion {
            DeclFlags::COMPANION
        } else {
            DeclFlags::empty()
        }
    }

    /// `@Name`, `@a.b.Name(arg, key = value)`
    fn parse_annotation(&mut self) -> Result<Annotation, ParseError> {
        let start = self.cursor.expect(TokenKind::At)?.span;
        let mut name = self.cursor.expect_ident()?;
        while self.cursor.eat(TokenKind::Dot) {
            name = self.cursor.expect_ident()?;
        }

        let mut args = SmallVec::new();
        if self.cursor.eat(TokenKind::LParen) {
            self.cursor.skip_newlines();
            while !self.cursor.check(TokenKind::RParen) {
                let key = if matches!(self.cursor.current_kind(), TokenKind::Ident(_))
                    && self.cursor.peek_next_kind() == TokenKind::Eq
                {
                    let key = self.cursor.expect_ident()?;
                    self.cursor.advance();
                    Some(key)
                } else {
                    None
                };
                let value = self.parse_annotation_value()?;
                args.push(AnnotationArg { name: key, value });
                self.cursor.skip_newlines();
                if !self.cursor.eat(TokenKind::Comma) {
                    break;
                }
                self.cursor.skip_newlines();
            }
            self.cursor.expect(TokenKind::RParen)?;
        }

        Ok(Annotation {
            name,
            args,
            span: start.merge(self.cursor.previous_span()),
        })
    }

    fn parse_annotation_value(&mut self) -> Result<AnnotationValue, ParseError> {
        let token = self.cursor.advance();
        let value = match token.kind {
            TokenKind::Str(s) => AnnotationValue::Str(s),
            TokenKind::Int(n) => AnnotationValue::Int(n),
            TokenKind::Minus => match self.cursor.advance().kind {
                TokenKind::Int(n) => AnnotationValue::Int(-n),
                found => {
                    return Err(ParseError::expected(
                        ErrorCode::E1002,
                        "integer literal",
                        found,
                        self.cursor.previous_span(),
                    ));
                }
            },
            TokenKind::True => AnnotationValue::Bool(true),
            TokenKind::False => AnnotationValue::Bool(false),
            TokenKind::Ident(mut name) => {
                // `a.B`, `B::class`
                while self.cursor.eat(TokenKind::Dot) {
                    name = self.cursor.expect_ident()?;
                }
                if self.cursor.eat(TokenKind::ColonColon) {
                    self.cursor.expect(TokenKind::Class)?;
                }
                AnnotationValue::Ident(name)
            }
            found => {
                return Err(ParseError::expected(
                    ErrorCode::E1002,
                    "annotation argument",
                    found,
                    token.span,
                ));
            }
        };
        Ok(value)
    }

    /// `class`, `interface`, `object`, `enum class`, `companion object`.
    fn parse_class(
        &mut self,
        header: Header,
        parent: Option<DeclId>,
    ) -> Result<DeclId, ParseError> {
        let mut flags = header.flags;
        let keyword = self.cursor.advance();
        match keyword.kind {
            TokenKind::Interface => flags |= DeclFlags::INTERFACE,
            TokenKind::Object => flags |= DeclFlags::OBJECT,
            _ => {}
        }

        let name = if flags.contains(DeclFlags::COMPANION) && !self.cursor.check_ident() {
            self.interner().intern("Companion")
        } else {
            self.cursor.expect_ident()?
        };
        let type_params = self.parse_type_params()?;

        // Primary constructor, possibly `private constructor(...)`.
        let mut has_primary = false;
        let save = self.cursor.position();
        while matches!(self.cursor.current_kind(), TokenKind::Ident(n) if self.kw.is_modifier(n)) {
            self.cursor.advance();
        }
        self.cursor.eat(TokenKind::Constructor);
        let members = if self.cursor.check(TokenKind::LParen) {
            has_primary = true;
            self.parse_class_params()?
        } else {
            self.cursor.set_position(save);
            Vec::new()
        };

        let supertypes = if self.cursor.eat(TokenKind::Colon) {
            self.parse_supertypes()?
        } else {
            Vec::new()
        };

        let mut decl = Declaration::new(DeclKind::Class, name, header.start.merge(keyword.span));
        decl.flags = flags;
        decl.type_params = type_params;
        decl.members = members;
        decl.supertypes = supertypes;
        decl.annotations = header.annotations;
        decl.parent = parent;
        let id = self.unit.decls.push(decl);
        trace!(?id, name = self.interner().lookup(name), "class");

        if self.cursor.check(TokenKind::LBrace) {
            self.parse_class_body(id)?;
        }

        let span = header.start.merge(self.cursor.previous_span());
        let decl = self.unit.decls.get_mut(id);
        decl.span = span;
        let is_constructible = !decl
            .flags
            .intersects(DeclFlags::INTERFACE | DeclFlags::OBJECT);
        if has_primary || (decl.constructors == 0 && is_constructible) {
            decl.constructors += 1;
        }
        Ok(id)
    }

    /// `(val x: Int, var y: String = "", z: Long)`
    fn parse_class_params(&mut self) -> Result<Vec<Member>, ParseError> {
        self.with_paren_depth(1, |p| -> Result<Vec<Member>, ParseError> {
            p.cursor.expect(TokenKind::LParen)?;
            let mut members = Vec::new();
            p.cursor.skip_newlines();
            while !p.cursor.check(TokenKind::RParen) {
                let start = p.cursor.current_span();
                p.parse_header()?;
                let (is_property, mutable) = match p.cursor.current_kind() {
                    TokenKind::Val => (true, false),
                    TokenKind::Var => (true, true),
                    _ => (false, false),
                };
                if is_property {
                    p.cursor.advance();
                }
                let name = p.cursor.expect_ident()?;
                p.cursor.expect(TokenKind::Colon)?;
                let ty = p.parse_type()?;
                let default = if p.cursor.eat(TokenKind::Eq) {
                    p.cursor.skip_newlines();
                    Some(p.parse_expr()?)
                } else {
                    None
                };
                members.push(Member {
                    name,
                    ty,
                    is_property,
                    mutable,
                    default,
                    span: start.merge(p.cursor.previous_span()),
                });
                p.cursor.skip_newlines();
                if !p.cursor.eat(TokenKind::Comma) {
                    break;
                }
                p.cursor.skip_newlines();
            }
            p.cursor.expect(TokenKind::RParen)?;
            Ok(members)
        })
        .map_err(|e| e.in_context(ErrorContext::Parameters))
    }

    /// `A, B<C>(args), D by impl`; constructor arguments are dropped.
    fn parse_supertypes(&mut self) -> Result<Vec<TypeRef>, ParseError> {
        let mut supertypes = Vec::new();
        loop {
            self.cursor.skip_newlines();
            supertypes.push(self.parse_type()?);
            if self.cursor.check(TokenKind::LParen) {
                self.parse_call_args()?;
            }
            if self.cursor.check_name(self.kw.by) {
                self.cursor.advance();
                self.parse_expr()?;
            }
            if !self.cursor.eat(TokenKind::Comma) {
                break;
            }
        }
        Ok(supertypes)
    }

    fn parse_class_body(&mut self, class: DeclId) -> Result<(), ParseError> {
        self.with_paren_depth(0, |p| {
            p.cursor.expect(TokenKind::LBrace)?;
            if p.unit.decls.get(class).flags.contains(DeclFlags::ENUM) {
                p.parse_enum_entries(class)
                    .map_err(|e| e.in_context(ErrorContext::EnumEntries))?;
            }
            loop {
                p.cursor.skip_separators();
                if p.cursor.check(TokenKind::RBrace) || p.cursor.is_at_end() {
                    break;
                }
                if let Err(e) = p.parse_declaration(Some(class)) {
                    p.errors.push(e);
                    p.recover_to_declaration();
                }
            }
            p.cursor.expect(TokenKind::RBrace)?;
            Ok(())
        })
    }

    /// `RED, GREEN("g") { ... };`
    fn parse_enum_entries(&mut self, enum_id: DeclId) -> Result<(), ParseError> {
        let enum_name = self.unit.decls.get(enum_id).name;
        loop {
            self.cursor.skip_newlines();
            // Skip annotations on entries.
            while self.cursor.check(TokenKind::At) {
                self.parse_annotation()?;
                self.cursor.skip_newlines();
            }
            let TokenKind::Ident(name) = self.cursor.current_kind() else {
                break;
            };
            let span = self.cursor.advance().span;

            let body = if self.cursor.check(TokenKind::LParen) {
                let args = self.parse_call_args()?;
                let callee = self.unit.arena.ident(enum_name, span);
                let args = self.unit.arena.alloc_call_args(args);
                Some(
                    self.unit
                        .arena
                        .alloc(ExprKind::Call { callee, args }, span),
                )
            } else {
                None
            };
            if self.cursor.check(TokenKind::LBrace) {
                self.skip_balanced_braces()?;
            }

            let mut entry = Declaration::new(DeclKind::Class, name, span);
            entry.flags = DeclFlags::ENUM_ENTRY | DeclFlags::OBJECT;
            entry.supertypes = vec![TypeRef::named(enum_name)];
            entry.parent = Some(enum_id);
            entry.body = body;
            self.unit.decls.push(entry);

            self.cursor.skip_newlines();
            if !self.cursor.eat(TokenKind::Comma) {
                break;
            }
        }
        self.cursor.skip_newlines();
        self.cursor.eat(TokenKind::Semicolon);
        Ok(())
    }

    /// `fun <T> Recv.name(params): Ret = body` or with a block body.
    fn parse_function(
        &mut self,
        header: Header,
        parent: Option<DeclId>,
    ) -> Result<DeclId, ParseError> {
        self.cursor.expect(TokenKind::Fun)?;
        let type_params = self.parse_type_params()?;
        let (receiver, name) = self.parse_receiver_and_name()?;
        let params = self.parse_fun_params()?;
        let ret = if self.cursor.eat(TokenKind::Colon) {
            self.parse_type()?
        } else {
            TypeRef::Infer
        };

        let body = match self.cursor.current_kind() {
            TokenKind::Eq => {
                self.cursor.advance();
                self.cursor.skip_newlines();
                Some(self.parse_expr()?)
            }
            TokenKind::LBrace => Some(self.parse_block()?),
            _ => None,
        };

        let mut decl = Declaration::new(
            DeclKind::Function,
            name,
            header.start.merge(self.cursor.previous_span()),
        );
        decl.flags = header.flags;
        decl.annotations = header.annotations;
        decl.type_params = type_params;
        decl.receiver = receiver;
        decl.params = params;
        decl.ret = Some(ret);
        decl.body = body;
        decl.parent = parent;
        let id = self.unit.decls.push(decl);
        trace!(?id, name = self.interner().lookup(name), "function");
        Ok(id)
    }

    /// `name` or `Recv<A>?.name`.
    fn parse_receiver_and_name(&mut self) -> Result<(Option<TypeRef>, Name), ParseError> {
        let first = self.cursor.expect_ident()?;
        let is_receiver = matches!(
            self.cursor.current_kind(),
            TokenKind::Dot | TokenKind::Lt | TokenKind::Question
        );
        if !is_receiver {
            return Ok((None, first));
        }
        let args = self.parse_type_args()?;
        let mut receiver = TypeRef::generic(first, args);
        while self.cursor.eat(TokenKind::Question) {
            receiver = receiver.nullable();
        }
        self.cursor.expect(TokenKind::Dot)?;
        let name = self.cursor.expect_ident()?;
        Ok((Some(receiver), name))
    }

    fn parse_fun_params(&mut self) -> Result<Vec<Param>, ParseError> {
        self.with_paren_depth(1, |p| -> Result<Vec<Param>, ParseError> {
            p.cursor.expect(TokenKind::LParen)?;
            let mut params = Vec::new();
            p.cursor.skip_newlines();
            while !p.cursor.check(TokenKind::RParen) {
                let start = p.cursor.current_span();
                p.parse_header()?;
                let name = p.cursor.expect_ident()?;
                p.cursor.expect(TokenKind::Colon)?;
                let ty = p.parse_type()?;
                let default = if p.cursor.eat(TokenKind::Eq) {
                    Some(p.parse_expr()?)
                } else {
                    None
                };
                params.push(Param {
                    name,
                    ty,
                    default,
                    span: start.merge(p.cursor.previous_span()),
                });
                p.cursor.skip_newlines();
                if !p.cursor.eat(TokenKind::Comma) {
                    break;
                }
                p.cursor.skip_newlines();
            }
            p.cursor.expect(TokenKind::RParen)?;
            Ok(params)
        })
        .map_err(|e| e.in_context(ErrorContext::Parameters))
    }

    /// `val [Recv.]name: T = init`, `var ...`, `val x by lazy { ... }`.
    fn parse_property(
        &mut self,
        header: Header,
        parent: Option<DeclId>,
    ) -> Result<DeclId, ParseError> {
        let mut flags = header.flags;
        if self.cursor.advance().kind == TokenKind::Var {
            flags |= DeclFlags::MUTABLE;
        }
        let type_params = self.parse_type_params()?;
        let (receiver, name) = self.parse_receiver_and_name()?;
        let ty = if self.cursor.eat(TokenKind::Colon) {
            self.parse_type()?
        } else {
            TypeRef::Infer
        };

        let body = if self.cursor.eat(TokenKind::Eq) {
            self.cursor.skip_newlines();
            Some(self.parse_expr()?)
        } else if self.cursor.check_name(self.kw.by) {
            self.cursor.advance();
            let delegate = self.parse_expr()?;
            Some(self.lazy_initializer(delegate))
        } else {
            None
        };

        let mut decl = Declaration::new(
            DeclKind::Property,
            name,
            header.start.merge(self.cursor.previous_span()),
        );
        decl.flags = flags;
        decl.annotations = header.annotations;
        decl.type_params = type_params;
        decl.receiver = receiver;
        decl.ret = Some(ty);
        decl.body = body;
        decl.parent = parent;
        Ok(self.unit.decls.push(decl))
    }

    /// `lazy { body }` evaluates to `body`.
    fn lazy_initializer(&mut self, delegate: reflect_ir::ExprId) -> reflect_ir::ExprId {
        if let ExprKind::Call { args, .. } = self.unit.arena.kind(delegate) {
            if let [CallArg { name: None, value }] = self.unit.arena.call_args(*args) {
                if let ExprKind::Lambda { params, body } = self.unit.arena.kind(*value) {
                    if params.is_empty() {
                        return *body;
                    }
                }
            }
        }
        delegate
    }

    /// `constructor(params) : this(args) { body }`
    fn skip_secondary_constructor(&mut self) -> Result<(), ParseError> {
        self.cursor.expect(TokenKind::Constructor)?;
        self.parse_fun_params()?;
        if self.cursor.eat(TokenKind::Colon) {
            self.cursor.advance();
            self.parse_call_args()?;
        }
        if self.cursor.check(TokenKind::LBrace) {
            self.skip_balanced_braces()?;
        }
        Ok(())
    }

    /// Skip `{ ... }` without building anything.
    fn skip_balanced_braces(&mut self) -> Result<(), ParseError> {
        let open = self.cursor.expect(TokenKind::LBrace)?.span;
        let mut depth = 1u32;
        while depth > 0 {
            match self.cursor.advance().kind {
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => depth -= 1,
                TokenKind::Eof => {
                    return Err(ParseError::new(ErrorCode::E1003, "unclosed `{`", open));
                }
                _ => {}
            }
        }
        Ok(())
    }
}
