//! @ai:module:intent Parse signature files into an ApiModel
//! @ai:module:layer application
//! @ai:module:public_api parse_signature, parse_file, ParseOptions
//! @ai:module:depends_on lexer, model, error
//! @ai:module:stateless true

use crate::error::{Error, Result};
use crate::lexer::{tokenize, Lexeme, Token};
use crate::model::{
    ApiModel, BoundKind, ClassItem, ClassKind, ConstructorItem, FieldItem, Line, Member,
    MethodItem, Modifiers, NullMode, Nullability, PackageItem, Parameter, TypeParam, TypeRef,
    WildcardBound,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// @ai:intent Options controlling how a signature file is interpreted
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParseOptions {
    /// Forced null mode. When unset the file header decides, defaulting to legacy.
    pub null_mode: Option<NullMode>,
}

impl ParseOptions {
    pub fn with_null_mode(null_mode: NullMode) -> Self {
        Self {
            null_mode: Some(null_mode),
        }
    }
}

/// @ai:intent Read and parse a signature file from disk
/// @ai:pre path exists and is readable
/// @ai:effects fs:read
pub fn parse_file(path: &Path, options: &ParseOptions) -> Result<ApiModel> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    parse_signature(&path.display().to_string(), &content, options)
}

/// @ai:intent Parse signature text into an immutable API model
/// @ai:post on error no partial model is returned
/// @ai:effects pure
pub fn parse_signature(source_name: &str, text: &str, options: &ParseOptions) -> Result<ApiModel> {
    let null_mode = resolve_null_mode(source_name, text, options)?;

    let lexemes = tokenize(text).map_err(|e| Error::MalformedSignature {
        file: source_name.to_string(),
        line: e.line,
        message: format!("unexpected character `{}`", e.text),
    })?;

    let mut parser = Parser {
        file: source_name,
        text,
        lexemes,
        pos: 0,
        null_mode,
    };
    let model = parser.parse_model()?;

    tracing::debug!(
        source = source_name,
        mode = %null_mode,
        packages = model.packages.len(),
        classes = model.class_count(),
        members = model.member_count(),
        "parsed signature file"
    );

    Ok(model)
}

/// @ai:intent Combine the requested null mode with the one implied by the file header
/// @ai:effects pure
fn resolve_null_mode(source_name: &str, text: &str, options: &ParseOptions) -> Result<NullMode> {
    let header = Regex::new(r"^//\s*Signature format:\s*(\S+)\s*$").expect("Invalid regex");

    let first = text
        .lines()
        .enumerate()
        .find(|(_, line)| !line.trim().is_empty());

    let from_header = match first {
        Some((index, line)) => match header.captures(line.trim()) {
            Some(captures) => {
                let version = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
                let mode = NullMode::from_format_version(version).ok_or_else(|| {
                    Error::MalformedSignature {
                        file: source_name.to_string(),
                        line: index + 1,
                        message: format!("unsupported signature format {}", version),
                    }
                })?;
                Some((mode, version.to_string(), index + 1))
            }
            None => None,
        },
        None => None,
    };

    match (options.null_mode, from_header) {
        (Some(requested), Some((implied, version, line))) if requested != implied => {
            Err(Error::MalformedSignature {
                file: source_name.to_string(),
                line,
                message: format!(
                    "signature format {} implies {} nullness but {} was requested",
                    version, implied, requested
                ),
            })
        }
        (Some(requested), _) => Ok(requested),
        (None, Some((implied, _, _))) => Ok(implied),
        (None, None) => Ok(NullMode::default()),
    }
}

/// @ai:intent Map an annotation name to the nullness it declares, if any
/// @ai:example ("androidx.annotation.Nullable") -> Some(Nullable)
/// @ai:example ("IntRange") -> None
/// @ai:effects pure
pub fn annotation_nullability(name: &str) -> Option<Nullability> {
    let simple = name.rsplit('.').next().unwrap_or(name);
    match simple {
        "Nullable" | "CheckForNull" | "RecentlyNullable" => Some(Nullability::Nullable),
        "NonNull" | "NotNull" | "Nonnull" | "RecentlyNonNull" => Some(Nullability::NonNull),
        _ => None,
    }
}

/// Annotations and modifier keywords preceding a declaration.
#[derive(Debug, Default)]
struct Prefix {
    modifiers: Modifiers,
    nullability: Option<Nullability>,
}

struct Parser<'a> {
    file: &'a str,
    text: &'a str,
    lexemes: Vec<Lexeme<'a>>,
    pos: usize,
    null_mode: NullMode,
}

impl<'a> Parser<'a> {
    // ------------------------------------------------------------------
    // Token cursor
    // ------------------------------------------------------------------

    fn peek(&self) -> Option<&Lexeme<'a>> {
        self.lexemes.get(self.pos)
    }

    fn peek_at(&self, offset: usize) -> Option<&Lexeme<'a>> {
        self.lexemes.get(self.pos + offset)
    }

    fn at(&self, token: Token) -> bool {
        self.peek().is_some_and(|l| l.token == token)
    }

    fn at_keyword(&self, keyword: &str) -> bool {
        self.peek()
            .is_some_and(|l| l.token == Token::Ident && l.text == keyword)
    }

    fn advance(&mut self) -> Option<Lexeme<'a>> {
        let lexeme = self.lexemes.get(self.pos).copied();
        if lexeme.is_some() {
            self.pos += 1;
        }
        lexeme
    }

    fn eat(&mut self, token: Token) -> bool {
        if self.at(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if self.at_keyword(keyword) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn current_line(&self) -> usize {
        self.peek()
            .or_else(|| self.lexemes.last())
            .map(|l| l.line)
            .unwrap_or(1)
    }

    fn error_at(&self, line: usize, message: impl Into<String>) -> Error {
        Error::MalformedSignature {
            file: self.file.to_string(),
            line,
            message: message.into(),
        }
    }

    fn unexpected(&self, expected: &str) -> Error {
        match self.peek() {
            Some(l) => self.error_at(
                l.line,
                format!("expected {}, found {} `{}`", expected, l.token.describe(), l.text),
            ),
            None => self.error_at(
                self.current_line(),
                format!("expected {}, found end of file", expected),
            ),
        }
    }

    fn expect(&mut self, token: Token) -> Result<Lexeme<'a>> {
        match self.peek().copied() {
            Some(l) if l.token == token => {
                self.pos += 1;
                Ok(l)
            }
            _ => Err(self.unexpected(token.describe())),
        }
    }

    fn expect_ident(&mut self, what: &str) -> Result<Lexeme<'a>> {
        match self.peek().copied() {
            Some(l) if l.token == Token::Ident => {
                self.pos += 1;
                Ok(l)
            }
            _ => Err(self.unexpected(what)),
        }
    }

    /// Dotted name: `a.b.C`.
    fn qualified_name(&mut self, what: &str) -> Result<String> {
        let mut name = self.expect_ident(what)?.text.to_string();
        while self.at(Token::Dot) && self.peek_at(1).is_some_and(|l| l.token == Token::Ident) {
            self.pos += 1;
            name.push('.');
            name.push_str(self.expect_ident(what)?.text);
        }
        Ok(name)
    }

    // ------------------------------------------------------------------
    // Packages and classes
    // ------------------------------------------------------------------

    fn parse_model(&mut self) -> Result<ApiModel> {
        let mut model = ApiModel::new(self.file, self.null_mode);

        while self.peek().is_some() {
            if !self.at_keyword("package") {
                return Err(self.unexpected("`package`"));
            }
            let line = self.current_line();
            self.pos += 1;
            let name = self.qualified_name("package name")?;
            self.expect(Token::LBrace)?;

            let package = model.packages.entry(name.clone()).or_insert_with(|| {
                let mut package = PackageItem::new(name.clone());
                package.line = Line(line);
                package
            });

            loop {
                if self.eat(Token::RBrace) {
                    break;
                }
                if self.peek().is_none() {
                    return Err(self.error_at(line, format!("unterminated package block `{}`", name)));
                }
                let class = self.parse_class(&name)?;
                if package.classes.contains_key(&class.name) {
                    return Err(self.error_at(
                        class.line.0,
                        format!("duplicate class `{}`", class.qualified_name),
                    ));
                }
                package.classes.insert(class.name.clone(), class);
            }
        }

        Ok(model)
    }

    fn parse_class(&mut self, package: &str) -> Result<ClassItem> {
        let line = self.current_line();
        let prefix = self.parse_prefix()?;

        let kind = if self.eat_keyword("class") {
            ClassKind::Class
        } else if self.eat_keyword("interface") {
            ClassKind::Interface
        } else if self.eat_keyword("enum") {
            ClassKind::Enum
        } else if self.at(Token::At) && self.peek_at(1).is_some_and(|l| l.text == "interface") {
            self.pos += 2;
            ClassKind::AnnotationType
        } else {
            return Err(self.unexpected("class, interface, enum or @interface"));
        };

        let name = self.qualified_name("class name")?;
        let mut class = ClassItem::new(package, name, kind);
        class.modifiers = prefix.modifiers;
        class.line = Line(line);

        if self.at(Token::Lt) {
            class.type_params = self.parse_type_params()?;
        }

        if self.eat_keyword("extends") {
            if kind == ClassKind::Interface {
                for ty in self.parse_type_list()? {
                    class.interfaces.insert(ty);
                }
            } else {
                class.superclass = Some(self.parse_type(None)?);
            }
        }

        if self.eat_keyword("implements") {
            for ty in self.parse_type_list()? {
                class.interfaces.insert(ty);
            }
        }

        self.expect(Token::LBrace)?;

        loop {
            if self.eat(Token::RBrace) {
                break;
            }
            if self.peek().is_none() {
                return Err(self.error_at(
                    line,
                    format!("unterminated class block `{}`", class.qualified_name),
                ));
            }
            let member = self.parse_member()?;
            let key = member.key();
            if class.members.contains_key(&key) {
                return Err(self.error_at(
                    member.line(),
                    format!("duplicate member `{}` in `{}`", key, class.qualified_name),
                ));
            }
            class.members.insert(key, member);
        }

        Ok(class)
    }

    /// Types separated by optional commas, up to the class body.
    fn parse_type_list(&mut self) -> Result<Vec<TypeRef>> {
        let mut types = vec![self.parse_type(None)?];
        loop {
            self.eat(Token::Comma);
            if self.at(Token::LBrace) || self.at_keyword("implements") || self.peek().is_none() {
                break;
            }
            types.push(self.parse_type(None)?);
        }
        Ok(types)
    }

    // ------------------------------------------------------------------
    // Members
    // ------------------------------------------------------------------

    fn parse_member(&mut self) -> Result<Member> {
        let keyword = self.expect_ident("member declaration")?;
        let line = keyword.line;

        match keyword.text {
            "ctor" => self.parse_constructor(line).map(Member::Constructor),
            "method" => self.parse_method(line).map(Member::Method),
            "field" => self.parse_field(line, false).map(Member::Field),
            "enum_constant" => self.parse_field(line, true).map(Member::Field),
            other => Err(self.error_at(line, format!("unsupported member kind `{}`", other))),
        }
    }

    fn parse_constructor(&mut self, line: usize) -> Result<ConstructorItem> {
        let prefix = self.parse_prefix()?;
        let type_params = if self.at(Token::Lt) {
            self.parse_type_params()?
        } else {
            Vec::new()
        };
        let name = self.qualified_name("constructor name")?;
        let parameters = self.parse_parameters()?;
        let throws = self.parse_throws()?;
        self.expect(Token::Semi)?;

        Ok(ConstructorItem {
            name,
            modifiers: prefix.modifiers,
            type_params,
            parameters,
            throws,
            line: Line(line),
        })
    }

    fn parse_method(&mut self, line: usize) -> Result<MethodItem> {
        let prefix = self.parse_prefix()?;
        let type_params = if self.at(Token::Lt) {
            self.parse_type_params()?
        } else {
            Vec::new()
        };
        let return_type = self.parse_type(prefix.nullability)?;
        let name = self.expect_ident("method name")?.text.to_string();
        let parameters = self.parse_parameters()?;
        let throws = self.parse_throws()?;

        let default_value = if self.eat_keyword("default") {
            Some(self.raw_value()?)
        } else {
            None
        };
        self.expect(Token::Semi)?;

        Ok(MethodItem {
            name,
            modifiers: prefix.modifiers,
            type_params,
            return_type,
            parameters,
            throws,
            default_value,
            line: Line(line),
        })
    }

    fn parse_field(&mut self, line: usize, enum_constant: bool) -> Result<FieldItem> {
        let prefix = self.parse_prefix()?;
        let ty = self.parse_type(prefix.nullability)?;
        let name = self.expect_ident("field name")?.text.to_string();

        let value = if self.eat(Token::Eq) {
            Some(self.raw_value()?)
        } else {
            None
        };
        self.expect(Token::Semi)?;

        Ok(FieldItem {
            name,
            modifiers: prefix.modifiers,
            ty,
            value,
            enum_constant,
            line: Line(line),
        })
    }

    fn parse_parameters(&mut self) -> Result<Vec<Parameter>> {
        self.expect(Token::LParen)?;
        let mut parameters = Vec::new();

        if self.eat(Token::RParen) {
            return Ok(parameters);
        }

        loop {
            let ty = self.parse_type(None)?;
            let name = if self.at(Token::Ident) {
                self.advance().map(|l| l.text.to_string())
            } else {
                None
            };
            parameters.push(Parameter { name, ty });

            if self.eat(Token::Comma) {
                continue;
            }
            self.expect(Token::RParen)?;
            break;
        }

        Ok(parameters)
    }

    fn parse_throws(&mut self) -> Result<Vec<TypeRef>> {
        let mut throws = Vec::new();
        if self.eat_keyword("throws") {
            throws.push(self.parse_type(None)?);
            while self.eat(Token::Comma) {
                throws.push(self.parse_type(None)?);
            }
        }
        Ok(throws)
    }

    /// Source text of a constant or default value, up to (not including) `;`.
    fn raw_value(&mut self) -> Result<String> {
        let start = match self.peek() {
            Some(l) if l.token != Token::Semi => l.start,
            _ => return Err(self.unexpected("value")),
        };
        let mut end = start;
        while let Some(l) = self.peek() {
            if l.token == Token::Semi {
                return Ok(self.text[start..end].to_string());
            }
            end = l.end;
            self.pos += 1;
        }
        Err(self.unexpected("';'"))
    }

    // ------------------------------------------------------------------
    // Modifiers, annotations and types
    // ------------------------------------------------------------------

    fn parse_prefix(&mut self) -> Result<Prefix> {
        let mut prefix = Prefix::default();

        loop {
            if self.at(Token::At) {
                if self.peek_at(1).is_some_and(|l| l.text == "interface") {
                    break;
                }
                let line = self.current_line();
                let (name, raw) = self.parse_annotation()?;
                match annotation_nullability(&name) {
                    Some(nullability) => {
                        prefix.nullability =
                            Some(self.merge_nullability(prefix.nullability, nullability, line)?);
                    }
                    None => prefix.modifiers.annotations.push(raw),
                }
                continue;
            }

            let is_modifier = match self.peek() {
                Some(l) if l.token == Token::Ident => prefix.modifiers.apply_keyword(l.text),
                _ => false,
            };
            if !is_modifier {
                break;
            }
            self.pos += 1;
        }

        Ok(prefix)
    }

    /// Returns the annotation name and its verbatim source text.
    fn parse_annotation(&mut self) -> Result<(String, String)> {
        let start = self.expect(Token::At)?.start;
        let name = self.qualified_name("annotation name")?;
        let mut end = self.lexemes[self.pos - 1].end;

        if self.at(Token::LParen) {
            let line = self.current_line();
            let mut depth = 0usize;
            loop {
                let Some(l) = self.advance() else {
                    return Err(self.error_at(line, "unterminated annotation arguments"));
                };
                match l.token {
                    Token::LParen => depth += 1,
                    Token::RParen => depth -= 1,
                    _ => {}
                }
                end = l.end;
                if depth == 0 {
                    break;
                }
            }
        }

        Ok((name, self.text[start..end].to_string()))
    }

    fn merge_nullability(
        &self,
        existing: Option<Nullability>,
        incoming: Nullability,
        line: usize,
    ) -> Result<Nullability> {
        match existing {
            Some(current) if current != incoming => {
                Err(self.error_at(line, "conflicting nullness annotations"))
            }
            _ => Ok(incoming),
        }
    }

    fn parse_type_params(&mut self) -> Result<Vec<TypeParam>> {
        self.expect(Token::Lt)?;
        let mut params = Vec::new();

        loop {
            let name = self.expect_ident("type parameter")?.text.to_string();
            let mut bounds = Vec::new();
            if self.eat_keyword("extends") {
                bounds.push(self.parse_type(None)?);
                while self.eat(Token::Amp) {
                    bounds.push(self.parse_type(None)?);
                }
            }
            params.push(TypeParam { name, bounds });

            if self.eat(Token::Comma) {
                continue;
            }
            self.expect(Token::Gt)?;
            break;
        }

        Ok(params)
    }

    /// Parses a type. `declared` is nullness already given by an annotation
    /// in the declaration prefix (`method @Nullable public Foo bar()`).
    fn parse_type(&mut self, declared: Option<Nullability>) -> Result<TypeRef> {
        let line = self.current_line();
        let mut annotated = declared;

        while self.at(Token::At) {
            let (name, _) = self.parse_annotation()?;
            if let Some(nullability) = annotation_nullability(&name) {
                annotated = Some(self.merge_nullability(annotated, nullability, line)?);
            }
        }

        if self.eat(Token::Question) {
            let bound = if self.eat_keyword("extends") {
                Some(BoundKind::Extends)
            } else if self.eat_keyword("super") {
                Some(BoundKind::Super)
            } else {
                None
            };
            let bound = match bound {
                Some(kind) => Some(WildcardBound {
                    kind,
                    bound: Box::new(self.parse_type(None)?),
                }),
                None => None,
            };
            return Ok(TypeRef {
                bound,
                ..TypeRef::named("?", Nullability::Unspecified)
            });
        }

        let mut ty = TypeRef::named(self.qualified_name("type")?, Nullability::Unspecified);

        if self.eat(Token::Lt) {
            loop {
                ty.args.push(self.parse_type(None)?);
                if self.eat(Token::Comma) {
                    continue;
                }
                self.expect(Token::Gt)?;
                break;
            }
        }

        // Element nullness of arrays (`String?[]`) is not tracked; only the
        // marker on the outermost type counts.
        let mut suffix = self.nullness_suffix();
        while self.at(Token::LBracket) {
            self.pos += 1;
            self.expect(Token::RBracket)?;
            ty.array_dims += 1;
            suffix = None;
        }
        if self.eat(Token::Ellipsis) {
            ty.varargs = true;
            suffix = None;
        }
        if let Some(marker) = self.nullness_suffix() {
            suffix = Some(marker);
        }

        ty.nullability = match (annotated, suffix) {
            (None, None) => self.null_mode.bare(),
            (Some(n), None) | (None, Some(n)) => n,
            (Some(a), Some(s)) if a == s => a,
            (Some(_), Some(_)) => {
                return Err(self.error_at(line, "conflicting nullness annotation and suffix"))
            }
        };

        Ok(ty)
    }

    /// `?` marks a nullable type and `!` one of unknown nullness.
    fn nullness_suffix(&mut self) -> Option<Nullability> {
        if self.eat(Token::Question) {
            Some(Nullability::Nullable)
        } else if self.eat(Token::Bang) {
            Some(Nullability::Unspecified)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MemberKey, Visibility};
    use pretty_assertions::assert_eq;

    fn legacy(text: &str) -> ApiModel {
        parse_signature("api.txt", text, &ParseOptions::with_null_mode(NullMode::Legacy)).unwrap()
    }

    fn null_aware(text: &str) -> ApiModel {
        parse_signature("api.txt", text, &ParseOptions::with_null_mode(NullMode::NullAware))
            .unwrap()
    }

    fn method<'m>(model: &'m ApiModel, class: &str, name: &str, params: &[&str]) -> &'m MethodItem {
        let key = MemberKey::Method(
            name.to_string(),
            params.iter().map(|p| p.to_string()).collect(),
        );
        match model.find_class(class).and_then(|c| c.member(&key)) {
            Some(Member::Method(m)) => m,
            other => panic!("no method {} in {}: {:?}", key, class, other),
        }
    }

    #[test]
    fn test_parse_classes_and_members() {
        let model = legacy(
            r#"
package test.pkg {
  public class MyTest1 {
    ctor public MyTest1();
    method public Double method(Float);
    field public Double field;
  }
  public abstract interface MyTest2 extends java.lang.Runnable {
  }
  public final enum Color {
    enum_constant public static final test.pkg.Color RED;
  }
  public abstract @interface Marker {
    method public abstract int value() default 5;
  }
}
"#,
        );

        let package = model.package("test.pkg").unwrap();
        let names: Vec<_> = package.classes.keys().cloned().collect();
        assert_eq!(names, vec!["MyTest1", "MyTest2", "Color", "Marker"]);

        let my_test = package.class("MyTest1").unwrap();
        assert_eq!(my_test.kind, ClassKind::Class);
        assert_eq!(my_test.qualified_name, "test.pkg.MyTest1");
        assert_eq!(my_test.modifiers.visibility, Visibility::Public);
        assert_eq!(my_test.members.len(), 3);
        assert_eq!(my_test.line.0, 3);

        let runnable = package.class("MyTest2").unwrap();
        assert_eq!(runnable.kind, ClassKind::Interface);
        assert_eq!(runnable.interface_names(), vec!["java.lang.Runnable"]);
        assert!(runnable.superclass.is_none());

        let color = package.class("Color").unwrap();
        assert_eq!(color.kind, ClassKind::Enum);
        assert!(color.fields().all(|f| f.enum_constant));

        let marker = method(&model, "test.pkg.Marker", "value", &[]);
        assert_eq!(marker.default_value.as_deref(), Some("5"));
        assert_eq!(package.class("Marker").unwrap().kind, ClassKind::AnnotationType);
    }

    #[test]
    fn test_annotation_nullness_in_legacy_mode() {
        let model = legacy(
            r#"
package test.pkg {
  public class MyTest {
    method public Double convert1(Float);
    method @Nullable public Double convert3(@Nullable Float);
    method @NonNull public Double convert4(@androidx.annotation.NonNull Float);
  }
}
"#,
        );

        let convert1 = method(&model, "test.pkg.MyTest", "convert1", &["Float"]);
        assert_eq!(convert1.return_nullability(), Nullability::Unspecified);
        assert_eq!(convert1.parameters[0].nullability(), Nullability::Unspecified);

        let convert3 = method(&model, "test.pkg.MyTest", "convert3", &["Float"]);
        assert_eq!(convert3.return_nullability(), Nullability::Nullable);
        assert_eq!(convert3.parameters[0].nullability(), Nullability::Nullable);

        let convert4 = method(&model, "test.pkg.MyTest", "convert4", &["Float"]);
        assert_eq!(convert4.return_nullability(), Nullability::NonNull);
        assert_eq!(convert4.parameters[0].nullability(), Nullability::NonNull);
        assert!(convert4.modifiers.annotations.is_empty());
    }

    #[test]
    fn test_suffix_nullness_in_null_aware_mode() {
        let model = null_aware(
            r#"
package test.pkg {
  public final class Outer {
    method public final String? method1(String, String?);
    method public final String method2(String!, @Nullable String);
  }
  public static final class Outer.Inner {
    ctor public Outer.Inner();
  }
}
"#,
        );

        let method1 = method(&model, "test.pkg.Outer", "method1", &["String", "String"]);
        assert_eq!(method1.return_nullability(), Nullability::Nullable);
        assert_eq!(method1.parameters[0].nullability(), Nullability::NonNull);
        assert_eq!(method1.parameters[1].nullability(), Nullability::Nullable);

        let method2 = method(&model, "test.pkg.Outer", "method2", &["String", "String"]);
        assert_eq!(method2.return_nullability(), Nullability::NonNull);
        assert_eq!(method2.parameters[0].nullability(), Nullability::Unspecified);
        assert_eq!(method2.parameters[1].nullability(), Nullability::Nullable);

        let inner = model.find_class("test.pkg.Outer.Inner").unwrap();
        assert!(inner.modifiers.is_static);
        assert_eq!(inner.constructors().count(), 1);
    }

    #[test]
    fn test_both_notations_parse_to_same_values() {
        let annotated = legacy(
            "package p {\n  public class C {\n    method @Nullable public String f(@Nullable String);\n  }\n}\n",
        );
        let suffixed = legacy(
            "package p {\n  public class C {\n    method public String? f(String?);\n  }\n}\n",
        );
        assert_eq!(annotated, suffixed);
    }

    #[test]
    fn test_generics_arrays_varargs_and_throws() {
        let model = legacy(
            r#"
package test.pkg {
  public class Box<T extends java.lang.Number & java.lang.Comparable<T>> extends test.pkg.Base<T> implements java.io.Serializable, java.lang.Cloneable {
    method public <E> java.util.Map<java.lang.String, java.util.List<? extends E>> group(E[][], int...) throws java.io.IOException, test.pkg.Failure;
    field public static final long MAX = 9223372036854775807L; // 0x7fffffffffffffffL
    field public static final java.lang.String NAME = "a; b";
  }
}
"#,
        );

        let class = model.find_class("test.pkg.Box").unwrap();
        assert_eq!(class.type_params[0].bounds.len(), 2);
        assert_eq!(class.superclass.as_ref().unwrap().to_string(), "test.pkg.Base<T>");
        assert_eq!(class.interfaces.len(), 2);

        let group = method(&model, "test.pkg.Box", "group", &["E[][]", "int..."]);
        assert_eq!(group.type_params[0].name, "E");
        assert_eq!(
            group.return_type.to_string(),
            "java.util.Map<java.lang.String, java.util.List<? extends E>>"
        );
        assert_eq!(group.throws.len(), 2);

        let values: Vec<_> = class.fields().map(|f| f.value.clone().unwrap()).collect();
        assert_eq!(values, vec!["9223372036854775807L", "\"a; b\""]);
    }

    #[test]
    fn test_parameter_names_are_optional() {
        let model = null_aware(
            "package p {\n  public class C {\n    method public void f(int count, String? label);\n  }\n}\n",
        );
        let f = method(&model, "p.C", "f", &["int", "String"]);
        assert_eq!(f.parameters[0].name.as_deref(), Some("count"));
        assert_eq!(f.parameters[1].display_name(1), "label");
    }

    #[test]
    fn test_other_annotations_kept_verbatim() {
        let model = legacy(
            "package p {\n  public class C {\n    method @IntRange(from=0, to=(5)) public int f();\n  }\n}\n",
        );
        let f = method(&model, "p.C", "f", &[]);
        assert_eq!(f.modifiers.annotations, vec!["@IntRange(from=0, to=(5))"]);
    }

    #[test]
    fn test_repeated_package_blocks_merge() {
        let model = legacy("package p {\n  public class A {\n  }\n}\npackage p {\n  public class B {\n  }\n}\n");
        assert_eq!(model.packages.len(), 1);
        assert_eq!(model.class_count(), 2);
    }

    #[test]
    fn test_header_selects_null_mode() {
        let text = "// Signature format: 3.0\npackage p {\n  public class C {\n    method public String f();\n  }\n}\n";
        let model = parse_signature("api.txt", text, &ParseOptions::default()).unwrap();
        assert_eq!(model.null_mode, NullMode::NullAware);
        assert_eq!(
            method(&model, "p.C", "f", &[]).return_nullability(),
            Nullability::NonNull
        );

        let err = parse_signature("api.txt", text, &ParseOptions::with_null_mode(NullMode::Legacy))
            .unwrap_err();
        assert_eq!(err.line(), Some(1));
    }

    #[test]
    fn test_unsupported_header_version() {
        let err = parse_signature("api.txt", "// Signature format: 9.0\n", &ParseOptions::default())
            .unwrap_err();
        assert!(err.to_string().contains("unsupported signature format 9.0"));
    }

    #[test]
    fn test_duplicate_member_is_malformed() {
        let err = parse_signature(
            "api.txt",
            "package p {\n  public class C {\n    method public void f(int);\n    method public void f(int count);\n  }\n}\n",
            &ParseOptions::default(),
        )
        .unwrap_err();
        assert_eq!(err.line(), Some(4));
        assert!(err.to_string().contains("duplicate member `f(int)`"));
    }

    #[test]
    fn test_duplicate_class_is_malformed() {
        let err = parse_signature(
            "api.txt",
            "package p {\n  public class C {\n  }\n  public interface C {\n  }\n}\n",
            &ParseOptions::default(),
        )
        .unwrap_err();
        assert_eq!(err.line(), Some(4));
    }

    #[test]
    fn test_unterminated_class_reports_opening_line() {
        let err = parse_signature(
            "api.txt",
            "package p {\n  public class C {\n    method public void f();\n",
            &ParseOptions::default(),
        )
        .unwrap_err();
        assert_eq!(err.line(), Some(2));
        assert!(err.to_string().contains("unterminated class block"));
    }

    #[test]
    fn test_unexpected_token() {
        let err = parse_signature(
            "api.txt",
            "package p {\n  public class C {\n    method public void f(;\n  }\n}\n",
            &ParseOptions::default(),
        )
        .unwrap_err();
        assert_eq!(err.line(), Some(3));
        assert!(err.to_string().contains("expected type"));
    }

    #[test]
    fn test_conflicting_nullness() {
        let err = parse_signature(
            "api.txt",
            "package p {\n  public class C {\n    method public void f(@NonNull String?);\n  }\n}\n",
            &ParseOptions::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("conflicting nullness"));
    }
}
