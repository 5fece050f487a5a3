use pretty_assertions::assert_eq;

use super::*;

#[test]
fn every_error_is_fatal() {
    let errors = [
        ExportError::Load(LoadError::DuplicateType("N.T".into())),
        ExportError::MissingType { id: 3 },
        ExportError::DuplicateLibrary {
            guid: Guid::NIL,
            other: "stdole".into(),
        },
        ExportError::Build {
            context: "N.T".into(),
            source: BuildError::MissingLibraryAttrs,
        },
        ExportError::Internal("oops".into()),
    ];
    for e in errors {
        assert!(e.code().is_fatal(), "{e}");
        assert!(e.to_diagnostic().is_error());
    }
}

#[test]
fn build_errors_carry_their_context() {
    let e = ExportError::build("creating `Widget`")(BuildError::DuplicateName("Widget".into()));
    assert_eq!(e.code(), ErrorCode::E1003);
    assert_eq!(
        e.to_string(),
        "type-library builder rejected creating `Widget`: name `Widget` is already defined in this library"
    );
    assert_eq!(
        e.to_diagnostic().subject.as_deref(),
        Some("creating `Widget`")
    );
}

#[test]
fn failure_reports_numeric_code() {
    let f = ExportFailure::from(ExportError::MissingType { id: 1 });
    assert_eq!(f.code().number(), 2);
    assert!(f.diagnostics.is_empty());
}

#[test]
fn dependency_failures_keep_the_inner_code() {
    let inner = ExportFailure::from(ExportError::DuplicateLibrary {
        guid: Guid::NIL,
        other: "Shapes".into(),
    });
    let e = ExportError::Dependency {
        unit: "Shapes".into(),
        source: Box::new(inner),
    };
    assert_eq!(e.code(), ErrorCode::E1001);
    assert_eq!(e.to_diagnostic().subject.as_deref(), Some("Shapes"));
}
