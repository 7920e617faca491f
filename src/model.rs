//! @ai:module:intent Define the in-memory API model built from signature files
//! @ai:module:layer domain
//! @ai:module:public_api ApiModel, PackageItem, ClassItem, Member, MemberKey, MethodItem, ConstructorItem, FieldItem, TypeRef, Nullability, NullMode
//! @ai:module:stateless true
//!
//! Packages own classes, classes own members. Nested classes are flattened into
//! their package under a dotted name (`Outer.Inner`). Source lines are carried
//! for reporting but never take part in equality, so a model compares equal to
//! itself after a write/parse round trip.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// @ai:intent Nullness state of a type, resolved once at parse time
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum Nullability {
    #[default]
    Unspecified,
    Nullable,
    NonNull,
}

impl Nullability {
    /// @ai:intent Annotation spelling used in messages and legacy output
    pub fn annotation(&self) -> Option<&'static str> {
        match self {
            Nullability::Unspecified => None,
            Nullability::Nullable => Some("@Nullable"),
            Nullability::NonNull => Some("@NonNull"),
        }
    }

    pub fn is_specified(&self) -> bool {
        *self != Nullability::Unspecified
    }
}

/// @ai:intent How a bare type (no `?`, no annotation) is interpreted
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum NullMode {
    /// Bare types carry no nullness information.
    #[default]
    Legacy,
    /// Bare types are non-null; `?` marks nullable types.
    NullAware,
}

impl NullMode {
    /// @ai:intent Nullability of a type written without any marker
    /// @ai:effects pure
    pub fn bare(&self) -> Nullability {
        match self {
            NullMode::Legacy => Nullability::Unspecified,
            NullMode::NullAware => Nullability::NonNull,
        }
    }

    /// @ai:intent Signature format version written in the file header
    pub fn format_version(&self) -> &'static str {
        match self {
            NullMode::Legacy => "2.0",
            NullMode::NullAware => "3.0",
        }
    }

    /// @ai:intent Map a header format version to the mode it implies
    /// @ai:example ("3.0") -> Some(NullAware)
    /// @ai:example ("9.1") -> None
    pub fn from_format_version(version: &str) -> Option<Self> {
        match version {
            "1.0" | "2.0" => Some(NullMode::Legacy),
            "3.0" => Some(NullMode::NullAware),
            _ => None,
        }
    }
}

impl fmt::Display for NullMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NullMode::Legacy => write!(f, "legacy"),
            NullMode::NullAware => write!(f, "null-aware"),
        }
    }
}

/// Source line of a declaration.
///
/// Lines are positional metadata: two declarations on different lines are
/// still the same declaration, so `Line` always compares equal.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Line(pub usize);

impl PartialEq for Line {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Eq for Line {}

impl Hash for Line {
    fn hash<H: Hasher>(&self, _state: &mut H) {}
}

/// @ai:intent Represents a position inside a signature file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Location {
    pub file: String,
    pub line: usize,
}

impl Location {
    /// @ai:intent Create a new Location
    pub fn new(file: impl Into<String>, line: usize) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// @ai:intent Declared visibility, ordered from most to least restrictive
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Private,
    #[default]
    PackagePrivate,
    Internal,
    Protected,
    Public,
}

impl Visibility {
    /// @ai:intent Rank used to detect reduced visibility
    pub fn rank(&self) -> u8 {
        match self {
            Visibility::Private => 0,
            Visibility::PackagePrivate | Visibility::Internal => 1,
            Visibility::Protected => 2,
            Visibility::Public => 3,
        }
    }

    pub fn keyword(&self) -> Option<&'static str> {
        match self {
            Visibility::Private => Some("private"),
            Visibility::PackagePrivate => None,
            Visibility::Internal => Some("internal"),
            Visibility::Protected => Some("protected"),
            Visibility::Public => Some("public"),
        }
    }

    pub fn describe(&self) -> &'static str {
        self.keyword().unwrap_or("package-private")
    }
}

/// @ai:intent Flat set of modifier flags plus non-nullness annotations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_final: bool,
    pub is_abstract: bool,
    pub is_default: bool,
    pub is_synchronized: bool,
    pub is_native: bool,
    pub is_transient: bool,
    pub is_volatile: bool,
    pub is_strictfp: bool,
    pub is_sealed: bool,
    pub is_deprecated: bool,
    /// Annotations other than nullness, kept verbatim (`@IntRange(from=0)`).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<String>,
}

impl Modifiers {
    /// @ai:intent Apply a modifier keyword, returning false if it is not one
    /// @ai:effects pure
    pub fn apply_keyword(&mut self, keyword: &str) -> bool {
        match keyword {
            "public" => self.visibility = Visibility::Public,
            "protected" => self.visibility = Visibility::Protected,
            "private" => self.visibility = Visibility::Private,
            "internal" => self.visibility = Visibility::Internal,
            "static" => self.is_static = true,
            "final" => self.is_final = true,
            "abstract" => self.is_abstract = true,
            "default" => self.is_default = true,
            "synchronized" => self.is_synchronized = true,
            "native" => self.is_native = true,
            "transient" => self.is_transient = true,
            "volatile" => self.is_volatile = true,
            "strictfp" => self.is_strictfp = true,
            "sealed" => self.is_sealed = true,
            "deprecated" => self.is_deprecated = true,
            _ => return false,
        }
        true
    }

    /// @ai:intent Modifier keywords in canonical output order
    pub fn keywords(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        out.extend(self.visibility.keyword());
        let flags = [
            (self.is_deprecated, "deprecated"),
            (self.is_sealed, "sealed"),
            (self.is_static, "static"),
            (self.is_final, "final"),
            (self.is_abstract, "abstract"),
            (self.is_default, "default"),
            (self.is_synchronized, "synchronized"),
            (self.is_native, "native"),
            (self.is_transient, "transient"),
            (self.is_volatile, "volatile"),
            (self.is_strictfp, "strictfp"),
        ];
        out.extend(flags.iter().filter(|(set, _)| *set).map(|(_, kw)| *kw));
        out
    }
}

/// @ai:intent Declaration kind of a class-like item
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ClassKind {
    Class,
    Interface,
    Enum,
    AnnotationType,
}

impl ClassKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            ClassKind::Class => "class",
            ClassKind::Interface => "interface",
            ClassKind::Enum => "enum",
            ClassKind::AnnotationType => "@interface",
        }
    }
}

/// @ai:intent Bound of a wildcard type argument
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BoundKind {
    Extends,
    Super,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct WildcardBound {
    pub kind: BoundKind,
    pub bound: Box<TypeRef>,
}

/// @ai:intent A type reference as written in a signature file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct TypeRef {
    /// Qualified name, primitive, type variable, or `?` for a wildcard.
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<TypeRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bound: Option<WildcardBound>,
    #[serde(default)]
    pub array_dims: usize,
    #[serde(default)]
    pub varargs: bool,
    #[serde(default)]
    pub nullability: Nullability,
}

const PRIMITIVES: &[&str] = &[
    "boolean", "byte", "char", "short", "int", "long", "float", "double", "void",
];

impl TypeRef {
    /// @ai:intent Create a plain named type with no arguments
    pub fn named(name: impl Into<String>, nullability: Nullability) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
            bound: None,
            array_dims: 0,
            varargs: false,
            nullability,
        }
    }

    pub fn is_wildcard(&self) -> bool {
        self.name == "?"
    }

    pub fn is_void(&self) -> bool {
        self.name == "void" && self.array_dims == 0 && !self.varargs
    }

    pub fn is_primitive(&self) -> bool {
        self.array_dims == 0 && !self.varargs && PRIMITIVES.contains(&self.name.as_str())
    }

    /// @ai:intent Erasure-level spelling used in member keys
    /// @ai:example (java.util.List<T>[]) -> "java.util.List[]"
    /// @ai:effects pure
    pub fn erasure(&self) -> String {
        let mut out = self.name.clone();
        for _ in 0..self.array_dims {
            out.push_str("[]");
        }
        if self.varargs {
            out.push_str("...");
        }
        out
    }

    /// @ai:intent Structural equality ignoring nullness at every level
    /// @ai:effects pure
    pub fn same_shape(&self, other: &TypeRef) -> bool {
        self.name == other.name
            && self.array_dims == other.array_dims
            && self.varargs == other.varargs
            && self.args.len() == other.args.len()
            && self
                .args
                .iter()
                .zip(&other.args)
                .all(|(a, b)| a.same_shape(b))
            && match (&self.bound, &other.bound) {
                (None, None) => true,
                (Some(a), Some(b)) => a.kind == b.kind && a.bound.same_shape(&b.bound),
                _ => false,
            }
    }
}

impl fmt::Display for TypeRef {
    /// Renders the type without nullness markers.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(bound) = &self.bound {
            let kw = match bound.kind {
                BoundKind::Extends => "extends",
                BoundKind::Super => "super",
            };
            write!(f, " {} {}", kw, bound.bound)?;
        }
        if !self.args.is_empty() {
            write!(f, "<")?;
            for (i, arg) in self.args.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", arg)?;
            }
            write!(f, ">")?;
        }
        for _ in 0..self.array_dims {
            write!(f, "[]")?;
        }
        if self.varargs {
            write!(f, "...")?;
        }
        Ok(())
    }
}

/// @ai:intent A generic type parameter declaration (`T extends Number`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TypeParam {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bounds: Vec<TypeRef>,
}

/// @ai:intent A method or constructor parameter
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Parameter {
    /// Declared name; older signature files omit it.
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub ty: TypeRef,
}

impl Parameter {
    pub fn nullability(&self) -> Nullability {
        self.ty.nullability
    }

    /// @ai:intent Name used in messages, falling back to a 1-based positional name
    /// @ai:example (None, 0) -> "arg1"
    pub fn display_name(&self, index: usize) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("arg{}", index + 1),
        }
    }
}

fn erased_params(parameters: &[Parameter]) -> Vec<String> {
    parameters.iter().map(|p| p.ty.erasure()).collect()
}

fn render_params(parameters: &[Parameter]) -> String {
    parameters
        .iter()
        .map(|p| p.ty.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// @ai:intent A declared method
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MethodItem {
    pub name: String,
    pub modifiers: Modifiers,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_params: Vec<TypeParam>,
    pub return_type: TypeRef,
    pub parameters: Vec<Parameter>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub throws: Vec<TypeRef>,
    /// Default value of an annotation-type element.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    pub line: Line,
}

impl MethodItem {
    pub fn return_nullability(&self) -> Nullability {
        self.return_type.nullability
    }

    /// @ai:intent Human-readable signature, e.g. `convert(Float, int)`
    pub fn signature(&self) -> String {
        format!("{}({})", self.name, render_params(&self.parameters))
    }
}

/// @ai:intent A declared constructor
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConstructorItem {
    /// Simple (dotted) class name as written, e.g. `Outer.Inner`.
    pub name: String,
    pub modifiers: Modifiers,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_params: Vec<TypeParam>,
    pub parameters: Vec<Parameter>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub throws: Vec<TypeRef>,
    pub line: Line,
}

impl ConstructorItem {
    pub fn signature(&self) -> String {
        format!("{}({})", self.name, render_params(&self.parameters))
    }
}

/// @ai:intent A declared field or enum constant
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldItem {
    pub name: String,
    pub modifiers: Modifiers,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    /// Constant value as written in the signature file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default)]
    pub enum_constant: bool,
    pub line: Line,
}

impl FieldItem {
    pub fn nullability(&self) -> Nullability {
        self.ty.nullability
    }
}

/// @ai:intent Identity of a member inside its class
///
/// Overloads are told apart by their erased parameter types; parameter names
/// never take part.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MemberKey {
    Constructor(Vec<String>),
    Method(String, Vec<String>),
    Field(String),
}

impl fmt::Display for MemberKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberKey::Constructor(params) => write!(f, "<init>({})", params.join(", ")),
            MemberKey::Method(name, params) => write!(f, "{}({})", name, params.join(", ")),
            MemberKey::Field(name) => write!(f, "{}", name),
        }
    }
}

/// @ai:intent Any member a class can declare
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "member", rename_all = "snake_case")]
pub enum Member {
    Constructor(ConstructorItem),
    Method(MethodItem),
    Field(FieldItem),
}

impl Member {
    /// @ai:intent Compute the lookup key used to match this member across models
    /// @ai:effects pure
    pub fn key(&self) -> MemberKey {
        match self {
            Member::Constructor(c) => MemberKey::Constructor(erased_params(&c.parameters)),
            Member::Method(m) => MemberKey::Method(m.name.clone(), erased_params(&m.parameters)),
            Member::Field(f) => MemberKey::Field(f.name.clone()),
        }
    }

    pub fn line(&self) -> usize {
        match self {
            Member::Constructor(c) => c.line.0,
            Member::Method(m) => m.line.0,
            Member::Field(f) => f.line.0,
        }
    }

    pub fn modifiers(&self) -> &Modifiers {
        match self {
            Member::Constructor(c) => &c.modifiers,
            Member::Method(m) => &m.modifiers,
            Member::Field(f) => &f.modifiers,
        }
    }
}

/// Serializes the member map as a plain list; keys are recomputed on load.
mod member_list {
    use super::{Member, MemberKey};
    use indexmap::IndexMap;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        members: &IndexMap<MemberKey, Member>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(members.values())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<IndexMap<MemberKey, Member>, D::Error> {
        let list = Vec::<Member>::deserialize(deserializer)?;
        Ok(list.into_iter().map(|m| (m.key(), m)).collect())
    }
}

/// @ai:intent A class, interface, enum or annotation type with its declared members
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClassItem {
    /// Name inside the package; nested types are dotted (`Outer.Inner`).
    pub name: String,
    pub qualified_name: String,
    pub kind: ClassKind,
    pub modifiers: Modifiers,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_params: Vec<TypeParam>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub superclass: Option<TypeRef>,
    #[serde(default)]
    pub interfaces: IndexSet<TypeRef>,
    #[serde(with = "member_list")]
    pub members: IndexMap<MemberKey, Member>,
    pub line: Line,
}

impl ClassItem {
    /// @ai:intent Create an empty class of the given kind
    pub fn new(package: &str, name: impl Into<String>, kind: ClassKind) -> Self {
        let name = name.into();
        let qualified_name = if package.is_empty() {
            name.clone()
        } else {
            format!("{}.{}", package, name)
        };
        Self {
            name,
            qualified_name,
            kind,
            modifiers: Modifiers::default(),
            type_params: Vec::new(),
            superclass: None,
            interfaces: IndexSet::new(),
            members: IndexMap::new(),
            line: Line::default(),
        }
    }

    pub fn member(&self, key: &MemberKey) -> Option<&Member> {
        self.members.get(key)
    }

    pub fn methods(&self) -> impl Iterator<Item = &MethodItem> {
        self.members.values().filter_map(|m| match m {
            Member::Method(method) => Some(method),
            _ => None,
        })
    }

    pub fn constructors(&self) -> impl Iterator<Item = &ConstructorItem> {
        self.members.values().filter_map(|m| match m {
            Member::Constructor(ctor) => Some(ctor),
            _ => None,
        })
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldItem> {
        self.members.values().filter_map(|m| match m {
            Member::Field(field) => Some(field),
            _ => None,
        })
    }

    /// @ai:intent Erased names of implemented interfaces
    pub fn interface_names(&self) -> Vec<String> {
        self.interfaces.iter().map(TypeRef::erasure).collect()
    }
}

/// @ai:intent A package and the classes declared in it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PackageItem {
    pub name: String,
    pub classes: IndexMap<String, ClassItem>,
    pub line: Line,
}

impl PackageItem {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            classes: IndexMap::new(),
            line: Line::default(),
        }
    }

    pub fn class(&self, name: &str) -> Option<&ClassItem> {
        self.classes.get(name)
    }
}

/// @ai:intent A superclass or interface name that does not resolve inside the model
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UnresolvedReference {
    pub class: String,
    pub reference: String,
    pub line: usize,
}

/// @ai:intent Root of a parsed signature file
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiModel {
    /// Name of the signature file this model was parsed from.
    pub source: String,
    pub null_mode: NullMode,
    pub packages: IndexMap<String, PackageItem>,
}

impl PartialEq for ApiModel {
    /// Structural equality; the source name is not part of the API.
    fn eq(&self, other: &Self) -> bool {
        self.null_mode == other.null_mode && self.packages == other.packages
    }
}

impl Eq for ApiModel {}

impl ApiModel {
    pub fn new(source: impl Into<String>, null_mode: NullMode) -> Self {
        Self {
            source: source.into(),
            null_mode,
            packages: IndexMap::new(),
        }
    }

    pub fn package(&self, name: &str) -> Option<&PackageItem> {
        self.packages.get(name)
    }

    /// @ai:intent Look up a class by fully-qualified name
    /// @ai:post tries the longest package prefix first so `a.b.C.D` finds nested `C.D` in `a.b`
    /// @ai:effects pure
    pub fn find_class(&self, qualified_name: &str) -> Option<&ClassItem> {
        let mut split = qualified_name.len();
        while let Some(dot) = qualified_name[..split].rfind('.') {
            let (package, rest) = (&qualified_name[..dot], &qualified_name[dot + 1..]);
            if let Some(class) = self.package(package).and_then(|p| p.class(rest)) {
                return Some(class);
            }
            split = dot;
        }
        self.package("").and_then(|p| p.class(qualified_name))
    }

    /// @ai:intent Iterate over all classes in stored order
    pub fn classes(&self) -> impl Iterator<Item = &ClassItem> {
        self.packages.values().flat_map(|p| p.classes.values())
    }

    pub fn class_count(&self) -> usize {
        self.packages.values().map(|p| p.classes.len()).sum()
    }

    pub fn member_count(&self) -> usize {
        self.classes().map(|c| c.members.len()).sum()
    }

    /// @ai:intent List superclass/interface names whose package is in this model but whose class is not
    /// @ai:effects pure
    pub fn unresolved_references(&self) -> Vec<UnresolvedReference> {
        let mut unresolved = Vec::new();

        for class in self.classes() {
            let references = class.superclass.iter().chain(class.interfaces.iter());
            for reference in references {
                let name = reference.name.as_str();
                if self.find_class(name).is_some() || !self.owns_package_of(name) {
                    continue;
                }
                unresolved.push(UnresolvedReference {
                    class: class.qualified_name.clone(),
                    reference: name.to_string(),
                    line: class.line.0,
                });
            }
        }

        unresolved
    }

    fn owns_package_of(&self, qualified_name: &str) -> bool {
        let mut prefix = qualified_name;
        while let Some(dot) = prefix.rfind('.') {
            prefix = &prefix[..dot];
            if self.packages.contains_key(prefix) {
                return true;
            }
        }
        false
    }
}
