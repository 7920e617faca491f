//! @ai:module:intent Render an API model back into canonical signature text
//! @ai:module:layer infrastructure
//! @ai:module:public_api write_signature
//! @ai:module:depends_on model
//! @ai:module:stateless true

use crate::model::{
    ApiModel, BoundKind, ClassItem, ClassKind, ConstructorItem, FieldItem, Member, MethodItem,
    Modifiers, NullMode, Nullability, Parameter, TypeParam, TypeRef,
};

const INDENT: &str = "  ";

/// @ai:intent Write a model as signature text that parses back to an equal model
/// @ai:post output starts with the format header for the model's null mode
/// @ai:effects pure
pub fn write_signature(model: &ApiModel) -> String {
    let mode = model.null_mode;
    let mut output = format!("// Signature format: {}\n", mode.format_version());

    for package in model.packages.values() {
        output.push_str(&format!("package {} {{\n", package.name));
        for class in package.classes.values() {
            write_class(&mut output, class, mode);
        }
        output.push_str("}\n");
    }

    output
}

fn write_class(output: &mut String, class: &ClassItem, mode: NullMode) {
    output.push_str(INDENT);
    output.push_str(&prefix(&class.modifiers, None, mode));
    output.push_str(class.kind.keyword());
    output.push(' ');
    output.push_str(&class.name);
    output.push_str(&type_params(&class.type_params, mode));

    if let Some(superclass) = &class.superclass {
        output.push_str(&format!(" extends {}", render_type(superclass, mode)));
    }
    if !class.interfaces.is_empty() {
        let keyword = match class.kind {
            ClassKind::Interface => "extends",
            _ => "implements",
        };
        let names: Vec<_> = class.interfaces.iter().map(|t| render_type(t, mode)).collect();
        output.push_str(&format!(" {} {}", keyword, names.join(", ")));
    }
    output.push_str(" {\n");

    for member in class.members.values() {
        output.push_str(INDENT);
        output.push_str(INDENT);
        match member {
            Member::Constructor(ctor) => output.push_str(&constructor(ctor, mode)),
            Member::Method(method) => output.push_str(&method_line(method, mode)),
            Member::Field(field) => output.push_str(&field_line(field, mode)),
        }
        output.push('\n');
    }

    output.push_str(INDENT);
    output.push_str("}\n");
}

fn constructor(ctor: &ConstructorItem, mode: NullMode) -> String {
    format!(
        "ctor {}{}{}({}){};",
        prefix(&ctor.modifiers, None, mode),
        generic_prefix(&ctor.type_params, mode),
        ctor.name,
        parameters(&ctor.parameters, mode),
        throws(&ctor.throws, mode)
    )
}

fn method_line(method: &MethodItem, mode: NullMode) -> String {
    let mut line = format!(
        "method {}{}{} {}({}){}",
        prefix(&method.modifiers, Some(&method.return_type), mode),
        generic_prefix(&method.type_params, mode),
        declared_type(&method.return_type, mode),
        method.name,
        parameters(&method.parameters, mode),
        throws(&method.throws, mode)
    );
    if let Some(value) = &method.default_value {
        line.push_str(&format!(" default {}", value));
    }
    line.push(';');
    line
}

fn field_line(field: &FieldItem, mode: NullMode) -> String {
    let keyword = if field.enum_constant { "enum_constant" } else { "field" };
    let mut line = format!(
        "{} {}{} {}",
        keyword,
        prefix(&field.modifiers, Some(&field.ty), mode),
        declared_type(&field.ty, mode),
        field.name
    );
    if let Some(value) = &field.value {
        line.push_str(&format!(" = {}", value));
    }
    line.push(';');
    line
}

/// Annotations, then the nullness annotation of the declared type (legacy
/// mode only), then modifier keywords. Ends with a space when non-empty.
fn prefix(modifiers: &Modifiers, declared: Option<&TypeRef>, mode: NullMode) -> String {
    let mut parts: Vec<&str> = modifiers.annotations.iter().map(String::as_str).collect();
    if let (NullMode::Legacy, Some(ty)) = (mode, declared) {
        parts.extend(ty.nullability.annotation());
    }
    parts.extend(modifiers.keywords());

    if parts.is_empty() {
        String::new()
    } else {
        format!("{} ", parts.join(" "))
    }
}

fn generic_prefix(params: &[TypeParam], mode: NullMode) -> String {
    let rendered = type_params(params, mode);
    if rendered.is_empty() {
        rendered
    } else {
        format!("{} ", rendered)
    }
}

fn type_params(params: &[TypeParam], mode: NullMode) -> String {
    if params.is_empty() {
        return String::new();
    }
    let rendered: Vec<String> = params
        .iter()
        .map(|param| {
            if param.bounds.is_empty() {
                param.name.clone()
            } else {
                let bounds: Vec<_> = param.bounds.iter().map(|b| render_type(b, mode)).collect();
                format!("{} extends {}", param.name, bounds.join(" & "))
            }
        })
        .collect();
    format!("<{}>", rendered.join(", "))
}

fn parameters(params: &[Parameter], mode: NullMode) -> String {
    params
        .iter()
        .map(|param| match &param.name {
            Some(name) => format!("{} {}", render_type(&param.ty, mode), name),
            None => render_type(&param.ty, mode),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn throws(types: &[TypeRef], mode: NullMode) -> String {
    if types.is_empty() {
        return String::new();
    }
    let rendered: Vec<_> = types.iter().map(|t| render_type(t, mode)).collect();
    format!(" throws {}", rendered.join(", "))
}

/// A member's own type; in legacy mode its annotation already went into the prefix.
fn declared_type(ty: &TypeRef, mode: NullMode) -> String {
    match mode {
        NullMode::Legacy => render_shape(ty, mode),
        NullMode::NullAware => render_type(ty, mode),
    }
}

fn render_type(ty: &TypeRef, mode: NullMode) -> String {
    if ty.is_wildcard() {
        return render_shape(ty, mode);
    }
    match (mode, ty.nullability) {
        (NullMode::Legacy, nullability) => match nullability.annotation() {
            Some(annotation) => format!("{} {}", annotation, render_shape(ty, mode)),
            None => render_shape(ty, mode),
        },
        (NullMode::NullAware, Nullability::NonNull) => render_shape(ty, mode),
        (NullMode::NullAware, Nullability::Nullable) => format!("{}?", render_shape(ty, mode)),
        (NullMode::NullAware, Nullability::Unspecified) => format!("{}!", render_shape(ty, mode)),
    }
}

/// The type without its own nullness marker; nested types keep theirs.
fn render_shape(ty: &TypeRef, mode: NullMode) -> String {
    let mut out = ty.name.clone();

    if let Some(bound) = &ty.bound {
        let keyword = match bound.kind {
            BoundKind::Extends => "extends",
            BoundKind::Super => "super",
        };
        out.push_str(&format!(" {} {}", keyword, render_type(&bound.bound, mode)));
    }
    if !ty.args.is_empty() {
        let args: Vec<_> = ty.args.iter().map(|a| render_type(a, mode)).collect();
        out.push_str(&format!("<{}>", args.join(", ")));
    }
    for _ in 0..ty.array_dims {
        out.push_str("[]");
    }
    if ty.varargs {
        out.push_str("...");
    }

    out
}
