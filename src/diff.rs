//! @ai:module:intent Compare two API models and report incompatible changes
//! @ai:module:layer application
//! @ai:module:public_api diff, diff_files, diff_many
//! @ai:module:depends_on model, nullness, diagnostic, parser
//! @ai:module:stateless true
//!
//! The walk is driven by `previous`: everything it declares is looked up in
//! `current`, and elements that only exist in `current` are additions, which
//! are always compatible. Removals are positioned in the previous file, all
//! other findings in the current one.

use crate::diagnostic::{Diagnostic, Diagnostics, Issue};
use crate::error::{Error, Result};
use crate::model::{
    ApiModel, ClassItem, ClassKind, ConstructorItem, FieldItem, Location, Member, MethodItem,
    Modifiers, Nullability, PackageItem, Parameter, TypeRef,
};
use crate::nullness::{compatible, Regression, Role, Verdict};
use crate::parser::{parse_file, ParseOptions};
use rayon::prelude::*;
use std::path::Path;

const OBJECT: &str = "java.lang.Object";

/// @ai:intent Compare two signature files and report incompatible changes
/// @ai:effects fs:read
pub fn diff_files(previous: &Path, current: &Path, options: &ParseOptions) -> Result<Diagnostics> {
    let previous = parse_file(previous, options)?;
    let current = parse_file(current, options)?;

    diff(&previous, &current)
}

/// @ai:intent Compare a previous API model against a current one
/// @ai:pre both models were parsed under the same null mode
/// @ai:post diagnostics follow previous's package, class and member order
/// @ai:effects pure
pub fn diff(previous: &ApiModel, current: &ApiModel) -> Result<Diagnostics> {
    if previous.null_mode != current.null_mode {
        return Err(Error::NullModeMismatch {
            previous: previous.null_mode,
            current: current.null_mode,
        });
    }

    let mut walk = Walk {
        previous,
        current,
        out: Diagnostics::new(&previous.source, &current.source),
    };

    for package in previous.packages.values() {
        match current.package(&package.name) {
            Some(matched) => walk.package(package, matched),
            None => walk.removed_package(package),
        }
    }

    tracing::debug!(
        previous = %previous.source,
        current = %current.source,
        findings = walk.out.len(),
        "compared api models"
    );

    Ok(walk.out)
}

/// @ai:intent Compare one previous model against several current models in parallel
/// @ai:post results are in the same order as `currents`
/// @ai:effects pure
pub fn diff_many(previous: &ApiModel, currents: &[ApiModel]) -> Vec<Result<Diagnostics>> {
    currents
        .par_iter()
        .map(|current| diff(previous, current))
        .collect()
}

struct Walk<'a> {
    previous: &'a ApiModel,
    current: &'a ApiModel,
    out: Diagnostics,
}

impl<'a> Walk<'a> {
    fn removed(&mut self, issue: Issue, message: String, target: String, line: usize) {
        let location = Location::new(&self.previous.source, line);
        self.out
            .push(Diagnostic::warning(issue, message, target, location));
    }

    fn changed(&mut self, issue: Issue, message: String, target: String, line: usize) {
        let location = Location::new(&self.current.source, line);
        self.out
            .push(Diagnostic::warning(issue, message, target, location));
    }

    fn removed_package(&mut self, package: &PackageItem) {
        if package.classes.is_empty() {
            return;
        }
        self.removed(
            Issue::RemovedPackage,
            format!("Removed package {}", package.name),
            package.name.clone(),
            package.line.0,
        );
    }

    fn package(&mut self, old: &PackageItem, new: &PackageItem) {
        for class in old.classes.values() {
            match new.class(&class.name) {
                Some(matched) => self.class(class, matched),
                None => self.removed(
                    Issue::RemovedClass,
                    format!("Removed {} {}", describe_kind(class.kind), class.qualified_name),
                    class.qualified_name.clone(),
                    class.line.0,
                ),
            }
        }
    }

    fn class(&mut self, old: &ClassItem, new: &ClassItem) {
        let name = &new.qualified_name;
        let line = new.line.0;

        if old.kind != new.kind {
            self.changed(
                Issue::ChangedClass,
                format!("Class {} changed class/interface declaration", name),
                name.clone(),
                line,
            );
        } else {
            self.class_shape(old, new);
        }

        for member in old.members.values() {
            match new.member(&member.key()) {
                Some(matched) => self.member(new, member, matched),
                None => self.removed_member(old, member),
            }
        }
    }

    /// Class-level rules; only meaningful when both sides declare the same kind.
    fn class_shape(&mut self, old: &ClassItem, new: &ClassItem) {
        let name = &new.qualified_name;
        let line = new.line.0;
        let (was, now) = (&old.modifiers, &new.modifiers);

        self.scope("Class", name, was, now, line);

        if was.is_static != now.is_static {
            self.changed(
                Issue::ChangedStatic,
                format!("Class {} has changed 'static' qualifier", name),
                name.clone(),
                line,
            );
        }
        if !was.is_final && now.is_final {
            self.changed(
                Issue::ChangedFinal,
                format!("Class {} added 'final' qualifier", name),
                name.clone(),
                line,
            );
        }
        // Interfaces and annotation types are implicitly abstract.
        if new.kind == ClassKind::Class && !was.is_abstract && now.is_abstract {
            self.changed(
                Issue::ChangedAbstract,
                format!("Class {} changed 'abstract' qualifier", name),
                name.clone(),
                line,
            );
        }

        if new.kind == ClassKind::Class {
            let before = superclass_name(old);
            let after = superclass_name(new);
            if before != after {
                self.changed(
                    Issue::ChangedSuperclass,
                    format!("Class {} superclass changed from {} to {}", name, before, after),
                    name.clone(),
                    line,
                );
            }
        }

        let current_interfaces = new.interface_names();
        for interface in old.interface_names() {
            if !current_interfaces.contains(&interface) {
                self.changed(
                    Issue::RemovedInterface,
                    format!("Class {} no longer implements {}", name, interface),
                    name.clone(),
                    line,
                );
            }
        }
    }

    fn removed_member(&mut self, class: &ClassItem, member: &Member) {
        let owner = &class.qualified_name;
        let (issue, message, target) = match member {
            Member::Constructor(ctor) => (
                Issue::RemovedMethod,
                format!("Removed constructor {}", owner),
                ctor_target(class, ctor),
            ),
            Member::Method(method) => (
                Issue::RemovedMethod,
                format!("Removed method {}.{}", owner, method.name),
                format!("{}.{}", owner, method.signature()),
            ),
            Member::Field(field) if field.enum_constant => (
                Issue::RemovedField,
                format!("Removed enum constant {}.{}", owner, field.name),
                format!("{}.{}", owner, field.name),
            ),
            Member::Field(field) => (
                Issue::RemovedField,
                format!("Removed field {}.{}", owner, field.name),
                format!("{}.{}", owner, field.name),
            ),
        };
        self.removed(issue, message, target, member.line());
    }

    fn member(&mut self, class: &ClassItem, old: &Member, new: &Member) {
        match (old, new) {
            (Member::Constructor(a), Member::Constructor(b)) => self.constructor(class, a, b),
            (Member::Method(a), Member::Method(b)) => self.method(class, a, b),
            (Member::Field(a), Member::Field(b)) => self.field(class, a, b),
            // Keys encode the member kind, so a match is always of the same kind.
            _ => {}
        }
    }

    fn constructor(&mut self, class: &ClassItem, old: &ConstructorItem, new: &ConstructorItem) {
        let target = ctor_target(class, new);
        let line = new.line.0;

        self.scope("Constructor", &target, &old.modifiers, &new.modifiers, line);
        self.throws("Constructor", &target, &old.throws, &new.throws, line);
        self.parameters(&class.qualified_name, &target, &old.parameters, &new.parameters, line);
    }

    fn method(&mut self, class: &ClassItem, old: &MethodItem, new: &MethodItem) {
        let owner = &class.qualified_name;
        let label = format!("{}.{}", owner, new.name);
        let target = format!("{}.{}", owner, new.signature());
        let line = new.line.0;
        let (was, now) = (&old.modifiers, &new.modifiers);

        self.scope("Method", &target, was, now, line);

        if was.is_static != now.is_static {
            self.changed(
                Issue::ChangedStatic,
                format!("Method {} has changed 'static' qualifier", target),
                target.clone(),
                line,
            );
        }
        if !was.is_final && now.is_final && !class.modifiers.is_final {
            self.changed(
                Issue::ChangedFinal,
                format!("Method {} has added 'final' qualifier", target),
                target.clone(),
                line,
            );
        }
        if !was.is_abstract && now.is_abstract {
            self.changed(
                Issue::ChangedAbstract,
                format!("Method {} has changed 'abstract' qualifier", target),
                target.clone(),
                line,
            );
        }
        if !old.return_type.same_shape(&new.return_type) {
            self.changed(
                Issue::ChangedType,
                format!(
                    "Method {} has changed return type from {} to {}",
                    target, old.return_type, new.return_type
                ),
                target.clone(),
                line,
            );
        }

        self.throws("Method", &target, &old.throws, &new.throws, line);

        if !new.return_type.is_void() {
            let verdict = compatible(old.return_nullability(), new.return_nullability(), Role::Return);
            if let Verdict::Regressed(regression) = verdict {
                let subject = format!("method {}", label);
                let message = nullness_message(regression, &subject, "method return");
                self.changed(Issue::InvalidNullConversion, message, target.clone(), line);
            }
        }

        self.parameters(&label, &target, &old.parameters, &new.parameters, line);
    }

    fn field(&mut self, class: &ClassItem, old: &FieldItem, new: &FieldItem) {
        let target = format!("{}.{}", class.qualified_name, new.name);
        let line = new.line.0;
        let (was, now) = (&old.modifiers, &new.modifiers);

        self.scope("Field", &target, was, now, line);

        if was.is_static != now.is_static {
            self.changed(
                Issue::ChangedStatic,
                format!("Field {} has changed 'static' qualifier", target),
                target.clone(),
                line,
            );
        }
        if !was.is_final && now.is_final {
            self.changed(
                Issue::ChangedFinal,
                format!("Field {} has added 'final' qualifier", target),
                target.clone(),
                line,
            );
        }
        if !old.ty.same_shape(&new.ty) {
            self.changed(
                Issue::ChangedType,
                format!("Field {} has changed type from {} to {}", target, old.ty, new.ty),
                target.clone(),
                line,
            );
        }
        if let (Some(before), Some(after)) = (&old.value, &new.value) {
            if before != after {
                self.changed(
                    Issue::ChangedValue,
                    format!("Field {} has changed value from {} to {}", target, before, after),
                    target.clone(),
                    line,
                );
            }
        }

        let verdict = compatible(old.nullability(), new.nullability(), Role::Return);
        if let Verdict::Regressed(regression) = verdict {
            let subject = format!("field {}", target);
            let message = nullness_message(regression, &subject, "field");
            self.changed(Issue::InvalidNullConversion, message, target, line);
        }
    }

    /// Parameters line up by index because matched members share erased types.
    fn parameters(
        &mut self,
        owner: &str,
        target: &str,
        old: &[Parameter],
        new: &[Parameter],
        line: usize,
    ) {
        for (index, (before, after)) in old.iter().zip(new).enumerate() {
            let verdict = compatible(before.nullability(), after.nullability(), Role::Parameter);
            if let Verdict::Regressed(regression) = verdict {
                let subject = format!("parameter {} in {}", after.display_name(index), owner);
                let message = nullness_message(regression, &subject, "parameter");
                self.changed(Issue::InvalidNullConversion, message, target.to_string(), line);
            }
        }
    }

    fn scope(&mut self, what: &str, target: &str, was: &Modifiers, now: &Modifiers, line: usize) {
        if now.visibility.rank() < was.visibility.rank() {
            self.changed(
                Issue::ChangedScope,
                format!(
                    "{} {} changed visibility from {} to {}",
                    what,
                    target,
                    was.visibility.describe(),
                    now.visibility.describe()
                ),
                target.to_string(),
                line,
            );
        }
    }

    fn throws(&mut self, what: &str, target: &str, old: &[TypeRef], new: &[TypeRef], line: usize) {
        let before: Vec<String> = old.iter().map(TypeRef::erasure).collect();
        for thrown in new {
            let name = thrown.erasure();
            if !before.contains(&name) {
                self.changed(
                    Issue::ChangedThrows,
                    format!("{} {} added thrown exception {}", what, target, name),
                    target.to_string(),
                    line,
                );
            }
        }
    }
}

fn nullness_message(regression: Regression, subject: &str, position: &str) -> String {
    match regression {
        Regression::RemovedNullable => format!(
            "Attempted to remove {} annotation from {}",
            annotation(Nullability::Nullable),
            subject
        ),
        Regression::RemovedNonNull => format!(
            "Attempted to remove {} annotation from {}",
            annotation(Nullability::NonNull),
            subject
        ),
        Regression::NarrowedParameter => format!(
            "Attempted to change {} from @Nullable to @NonNull: incompatible change for {}",
            position, subject
        ),
        Regression::WidenedReturn => format!(
            "Attempted to change {} from @NonNull to @Nullable: incompatible change for {}",
            position, subject
        ),
    }
}

fn annotation(nullability: Nullability) -> &'static str {
    nullability.annotation().unwrap_or_default()
}

fn describe_kind(kind: ClassKind) -> &'static str {
    match kind {
        ClassKind::Class => "class",
        ClassKind::Interface => "interface",
        ClassKind::Enum => "enum",
        ClassKind::AnnotationType => "annotation",
    }
}

fn superclass_name(class: &ClassItem) -> String {
    class
        .superclass
        .as_ref()
        .map(TypeRef::erasure)
        .unwrap_or_else(|| OBJECT.to_string())
}

fn ctor_target(class: &ClassItem, ctor: &ConstructorItem) -> String {
    let params: Vec<String> = ctor.parameters.iter().map(|p| p.ty.to_string()).collect();
    format!("{}({})", class.qualified_name, params.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NullMode;
    use crate::parser::parse_signature;
    use pretty_assertions::assert_eq;

    fn parse(name: &str, text: &str, mode: NullMode) -> ApiModel {
        parse_signature(name, text, &ParseOptions::with_null_mode(mode)).unwrap()
    }

    fn check(previous: &str, current: &str) -> Diagnostics {
        let previous = parse("released-api.txt", previous, NullMode::Legacy);
        let current = parse("load-api.txt", current, NullMode::Legacy);
        diff(&previous, &current).unwrap()
    }

    fn rendered(diagnostics: &Diagnostics) -> Vec<String> {
        diagnostics.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_class_to_interface_is_one_changed_class() {
        let diagnostics = check(
            "package test.pkg {\n  public class MyTest1 {\n  }\n}\n",
            "package test.pkg {\n  public interface MyTest1 {\n  }\n}\n",
        );
        assert_eq!(
            rendered(&diagnostics),
            vec!["load-api.txt:2: warning: Class test.pkg.MyTest1 changed class/interface declaration [ChangedClass:23]"]
        );
    }

    #[test]
    fn test_removed_method_and_field() {
        let diagnostics = check(
            r#"
package test.pkg {
  public class MyTest1 {
    method public Double method(Float);
    field public Double field;
  }
}
"#,
            r#"
package test.pkg {
  public class MyTest1 {
  }
}
"#,
        );
        assert_eq!(
            rendered(&diagnostics),
            vec![
                "released-api.txt:4: warning: Removed method test.pkg.MyTest1.method [RemovedMethod:9]",
                "released-api.txt:5: warning: Removed field test.pkg.MyTest1.field [RemovedField:10]",
            ]
        );
    }

    #[test]
    fn test_removed_nullable_annotations() {
        let diagnostics = check(
            r#"
package test.pkg {
  public class MyTest {
    method @Nullable public Double convert3(@Nullable Float);
  }
}
"#,
            r#"
package test.pkg {
  public class MyTest {
    method public Double convert3(Float);
  }
}
"#,
        );
        let messages: Vec<_> = diagnostics.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "Attempted to remove @Nullable annotation from method test.pkg.MyTest.convert3",
                "Attempted to remove @Nullable annotation from parameter arg1 in test.pkg.MyTest.convert3",
            ]
        );
        assert_eq!(diagnostics.codes(), vec![40, 40]);
    }

    #[test]
    fn test_nullness_direction() {
        let previous = r#"
package test.pkg {
  public class MyTest {
    method public Double convert5(@Nullable Float);
    method @NonNull public Double convert6(Float);
    method public Double convert7(@NonNull Float);
    method @Nullable public Double convert8(Float);
  }
}
"#;
        let current = r#"
package test.pkg {
  public class MyTest {
    method public Double convert5(@NonNull Float);
    method @Nullable public Double convert6(Float);
    method public Double convert7(@Nullable Float);
    method @NonNull public Double convert8(Float);
  }
}
"#;
        let diagnostics = check(previous, current);
        let messages: Vec<_> = diagnostics.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "Attempted to change parameter from @Nullable to @NonNull: incompatible change for parameter arg1 in test.pkg.MyTest.convert5",
                "Attempted to change method return from @NonNull to @Nullable: incompatible change for method test.pkg.MyTest.convert6",
            ]
        );
    }

    #[test]
    fn test_removed_nonnull_from_named_parameter() {
        let diagnostics = check(
            "package p {\n  public class C {\n    method public void run(@NonNull String task);\n  }\n}\n",
            "package p {\n  public class C {\n    method public void run(String task);\n  }\n}\n",
        );
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics.as_slice()[0].message,
            "Attempted to remove @NonNull annotation from parameter task in p.C.run"
        );
        assert_eq!(diagnostics.as_slice()[0].target, "p.C.run(String)");
    }

    #[test]
    fn test_null_aware_suffix_changes() {
        let previous = parse(
            "old.txt",
            "package p {\n  public class C {\n    method public String? name();\n    method public void set(String);\n    field public String label;\n  }\n}\n",
            NullMode::NullAware,
        );
        let current = parse(
            "new.txt",
            "package p {\n  public class C {\n    method public String name();\n    method public void set(String?);\n    field public String? label;\n  }\n}\n",
            NullMode::NullAware,
        );
        let diagnostics = diff(&previous, &current).unwrap();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics.as_slice()[0].message,
            "Attempted to change field from @NonNull to @Nullable: incompatible change for field p.C.label"
        );
    }

    #[test]
    fn test_kind_change_and_member_removal_both_reported() {
        let diagnostics = check(
            "package p {\n  public class C {\n    method public void a();\n  }\n}\n",
            "package p {\n  public interface C {\n  }\n}\n",
        );
        assert_eq!(diagnostics.codes(), vec![23, 9]);
    }

    #[test]
    fn test_removed_class_package_and_constructor() {
        let diagnostics = check(
            r#"
package gone {
  public class A {
  }
}
package empty {
}
package p {
  public class Outer {
  }
  public static class Outer.Inner {
    ctor public Outer.Inner(int);
  }
  public enum E {
    enum_constant public static final p.E A;
  }
  public class Removed {
  }
}
"#,
            r#"
package p {
  public class Outer {
  }
  public static class Outer.Inner {
  }
  public enum E {
  }
}
"#,
        );
        let messages: Vec<_> = diagnostics.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "Removed package gone",
                "Removed constructor p.Outer.Inner",
                "Removed enum constant p.E.A",
                "Removed class p.Removed",
            ]
        );
        assert_eq!(diagnostics.codes(), vec![7, 9, 10, 8]);
    }

    #[test]
    fn test_structural_changes() {
        let previous = r#"
package p {
  public class Base {
  }
  public class C implements java.lang.Runnable, java.io.Closeable {
    method public int size();
    method public void close() throws java.io.IOException;
    method public void run();
    method public static void util();
    field public static final int MAX = 10;
    field public long count;
  }
}
"#;
        let current = r#"
package p {
  public class Base {
  }
  public abstract class C extends p.Base implements java.io.Closeable {
    method public long size();
    method public void close() throws java.io.IOException, java.lang.InterruptedException;
    method protected final void run();
    method public void util();
    field public static final int MAX = 20;
    field public final long count;
  }
}
"#;
        let diagnostics = check(previous, current);
        let issues: Vec<_> = diagnostics.iter().map(|d| d.issue).collect();
        assert_eq!(
            issues,
            vec![
                Issue::ChangedAbstract,
                Issue::ChangedSuperclass,
                Issue::RemovedInterface,
                Issue::ChangedType,
                Issue::ChangedThrows,
                Issue::ChangedScope,
                Issue::ChangedFinal,
                Issue::ChangedStatic,
                Issue::ChangedValue,
                Issue::ChangedFinal,
            ]
        );
        assert_eq!(
            diagnostics.as_slice()[1].message,
            "Class p.C superclass changed from java.lang.Object to p.Base"
        );
        assert_eq!(
            diagnostics.as_slice()[5].message,
            "Method p.C.run() changed visibility from public to protected"
        );
    }

    #[test]
    fn test_final_method_in_final_class_is_silent() {
        let diagnostics = check(
            "package p {\n  public final class C {\n    method public void run();\n  }\n}\n",
            "package p {\n  public final class C {\n    method public final void run();\n  }\n}\n",
        );
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_additions_are_silent() {
        let diagnostics = check(
            "package p {\n  public class C {\n    method public void a(String);\n  }\n}\n",
            r#"
package p {
  public class C implements java.lang.Runnable {
    ctor public C();
    method public void a(@NonNull String);
    method public void b();
    field public int f;
  }
  public class D {
  }
}
package q {
  public class E {
  }
}
"#,
        );
        assert!(diagnostics.is_empty(), "{:?}", rendered(&diagnostics));
    }

    #[test]
    fn test_self_diff_is_empty_and_deterministic() {
        let text = r#"
package test.pkg {
  public abstract class MyTest<T> implements java.lang.Comparable<T> {
    ctor public MyTest(@Nullable String);
    method @NonNull public abstract java.util.List<T> items(int...) throws java.io.IOException;
    field public static final String NAME = "x";
  }
}
"#;
        let model = parse("api.txt", text, NullMode::Legacy);
        assert!(diff(&model, &model).unwrap().is_empty());

        let other = parse("api.txt", "package test.pkg {\n}\n", NullMode::Legacy);
        let first = diff(&model, &other).unwrap();
        let second = diff(&model, &other).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_null_mode_mismatch_is_rejected() {
        let legacy = parse("old.txt", "package p {\n}\n", NullMode::Legacy);
        let aware = parse("new.txt", "package p {\n}\n", NullMode::NullAware);
        let err = diff(&legacy, &aware).unwrap_err();
        assert!(matches!(
            err,
            Error::NullModeMismatch {
                previous: NullMode::Legacy,
                current: NullMode::NullAware
            }
        ));
    }

    #[test]
    fn test_diff_many_keeps_input_order() {
        let previous = parse(
            "old.txt",
            "package p {\n  public class A {\n  }\n  public class B {\n  }\n}\n",
            NullMode::Legacy,
        );
        let currents = vec![
            parse("a.txt", "package p {\n  public class B {\n  }\n}\n", NullMode::Legacy),
            parse("b.txt", "package p {\n  public class A {\n  }\n}\n", NullMode::Legacy),
            parse("c.txt", "package p {\n}\n", NullMode::NullAware),
        ];
        let results = diff_many(&previous, &currents);

        let first = results[0].as_ref().unwrap();
        assert_eq!(first.current, "a.txt");
        assert_eq!(first.as_slice()[0].message, "Removed class p.A");
        let second = results[1].as_ref().unwrap();
        assert_eq!(second.as_slice()[0].message, "Removed class p.B");
        assert!(results[2].is_err());
    }

    #[test]
    fn test_diff_files_reads_both_sides() {
        let dir = tempfile::tempdir().unwrap();
        let old = dir.path().join("old.txt");
        let new = dir.path().join("new.txt");
        std::fs::write(&old, "package p {\n  public class A {\n  }\n}\n").unwrap();
        std::fs::write(&new, "package p {\n}\n").unwrap();

        let diagnostics = diff_files(&old, &new, &ParseOptions::default()).unwrap();
        assert_eq!(diagnostics.count(Issue::RemovedClass), 1);

        let missing = dir.path().join("missing.txt");
        assert!(diff_files(&old, &missing, &ParseOptions::default()).is_err());
    }
}
