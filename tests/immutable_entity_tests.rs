//! Scenario tests for the two usage shapes of the entity copier.
//!
//! - Direct mode: `Person` carries the behavior itself.
//! - Composition mode: `ImmutableStudent` holds a `Student` and delegates to a
//!   copier decorating it.

use immutable_entity::{
    Attribute, CopyMode, EntityCopier, EntityError, ImmutableEntity, ResolutionFailure, accessor,
};
use rstest::rstest;

use entities::{ImmutableStudent, Person, Student};

// =============================================================================
// Test Entities
// =============================================================================

mod entities {
    use immutable_entity::{Entity, immutable_setters};

    /// Read-only attributes: private fields exposed through getters.
    #[derive(Debug, Default, PartialEq, Entity)]
    pub struct Person {
        name: String,
        age: i32,
    }

    impl Person {
        pub fn name(&self) -> &str {
            &self.name
        }

        pub const fn age(&self) -> i32 {
            self.age
        }
    }

    immutable_setters! {
        impl Person { name: String, age: i32 }
    }

    /// Publicly writable attributes.
    #[derive(Debug, Default, Clone, PartialEq, Entity)]
    pub struct Student {
        pub name: String,
        pub age: i32,
    }

    /// Composes a `Student` and hands out new wrappers from its setters.
    #[derive(Debug, Default, PartialEq)]
    pub struct ImmutableStudent {
        student: Student,
    }

    impl ImmutableStudent {
        pub const fn student(&self) -> &Student {
            &self.student
        }
    }

    impl From<Student> for ImmutableStudent {
        fn from(student: Student) -> Self {
            Self { student }
        }
    }

    impl std::ops::Deref for ImmutableStudent {
        type Target = Student;

        fn deref(&self) -> &Student {
            &self.student
        }
    }

    immutable_setters! {
        impl ImmutableStudent(student: Student) { name: String, age: i32 }
    }
}

// =============================================================================
// Direct Mode
// =============================================================================

#[test]
fn test_create_immutable_entity_directly() {
    let person1 = Person::default();

    let person2 = person1
        .set_name("Joseph".to_string())
        .and_then(|person| person.set_age(26))
        .unwrap();

    assert_ne!(person1, person2);
    assert_eq!(person2.name(), "Joseph");
    assert_eq!(person2.age(), 26);
    assert_eq!(person1.name(), "");
    assert_eq!(person1.age(), 0);
}

#[test]
fn test_intermediate_instances_are_distinct() {
    let person1 = Person::default();
    let renamed = person1.set_name("Joseph".to_string()).unwrap();
    let aged = renamed.set_age(26).unwrap();

    assert!(!std::ptr::eq(&person1, &renamed));
    assert!(!std::ptr::eq(&renamed, &aged));
    assert_eq!(renamed.name(), "Joseph");
    assert_eq!(renamed.age(), 0);
    assert_eq!(aged.name(), "Joseph");
    assert_eq!(aged.age(), 26);
}

#[test]
fn test_direct_mode_with_accessor_expression() {
    let person = Person::default()
        .set_field_by_expression(&accessor!(|person| person.age), 26_i32)
        .unwrap();

    assert_eq!(person.age(), 26);
    assert_eq!(person.name(), "");
}

#[test]
fn test_repeated_calls_are_equal_but_distinct() {
    let person = Person::default().set_name("Ada".to_string()).unwrap();

    let first = person.set_age(36).unwrap();
    let second = person.set_age(36).unwrap();

    assert_eq!(first, second);
    assert!(!std::ptr::eq(&first, &second));
}

#[test]
fn test_update_field_reads_source_value() {
    let person = Person::default().set_age(41).unwrap();
    let older = person
        .update_field(&Person::age_attribute(), |age| age + 1)
        .unwrap();

    assert_eq!(older.age(), 42);
    assert_eq!(person.age(), 41);
}

#[test]
fn test_direct_copier_reports_mode() {
    let person = Person::default();
    assert_eq!(EntityCopier::direct(&person).mode(), CopyMode::Direct);
    assert_eq!(EntityCopier::composing(&person).mode(), CopyMode::Composition);
}

// =============================================================================
// Composition Mode
// =============================================================================

#[test]
fn test_create_immutable_entity_with_composition() {
    let person1 = ImmutableStudent::default();

    let person2 = person1
        .set_name("Joseph".to_string())
        .and_then(|person| person.set_age(26))
        .unwrap();

    assert_ne!(person1, person2);
    assert_eq!(person2.name, "Joseph");
    assert_eq!(person2.age, 26);
    assert_eq!(person1.name, "");
    assert_eq!(person1.age, 0);
}

#[test]
fn test_both_shapes_observe_the_same_result() {
    let direct = Person::default()
        .set_name("Joseph".to_string())
        .and_then(|person| person.set_age(26))
        .unwrap();
    let composed = ImmutableStudent::default()
        .set_name("Joseph".to_string())
        .and_then(|student| student.set_age(26))
        .unwrap();

    assert_eq!(direct.name(), composed.name);
    assert_eq!(direct.age(), composed.age);
}

#[test]
fn test_composition_copier_decorates_held_value() {
    let wrapper = ImmutableStudent::from(Student {
        name: "Grace".to_string(),
        age: 30,
    });

    let copier = EntityCopier::composing(wrapper.student());
    let student = copier.set_field(&Student::age_attribute(), 31).unwrap();

    assert_eq!(student.name, "Grace");
    assert_eq!(student.age, 31);
    assert_eq!(wrapper.age, 30);
    assert!(std::ptr::eq(copier.source(), wrapper.student()));
}

// =============================================================================
// Error Handling
// =============================================================================

#[rstest]
#[case("person.age + 1", ResolutionFailure::ComputedExpression)]
#[case("person.name.len()", ResolutionFailure::MethodCall)]
#[case("person.address.city", ResolutionFailure::NestedPath)]
#[case("26", ResolutionFailure::Literal)]
#[case("|person| person.0", ResolutionFailure::TupleIndex)]
#[case("height", ResolutionFailure::UnknownAttribute)]
fn test_invalid_accessor_is_rejected(#[case] text: &str, #[case] reason: ResolutionFailure) {
    init_tracing();
    let person = Person::default();
    let result = person.set_field_by_expression(&text.into(), 26_i32);

    assert_eq!(
        result,
        Err(EntityError::AccessorResolution {
            entity: std::any::type_name::<Person>(),
            expression: text.to_string(),
            reason,
        })
    );
}

#[test]
fn test_wrong_value_type_is_rejected() {
    let person = Person::default();
    let error = person
        .set_field_by_expression(&accessor!(|person| person.age), 26_u64)
        .unwrap_err();

    assert!(matches!(
        error,
        EntityError::TypeMismatch {
            attribute: "age",
            expected: "i32",
            found: "u64",
            ..
        }
    ));
    assert!(error.is_pre_allocation());
}

#[test]
fn test_accessor_cannot_redirect_the_write() {
    // Names `age` but never touches the entity: the write still lands on `age`.
    let detached: Attribute<Student, i32> = Attribute::new("age", |_: &Student| &0);
    let student = Student {
        name: "Grace".to_string(),
        age: 30,
    };

    let aged = EntityCopier::composing(&student)
        .set_field(&detached, 31)
        .unwrap();

    assert_eq!(
        aged,
        Student {
            name: "Grace".to_string(),
            age: 31,
        }
    );
    assert_eq!(student.age, 30);
}

#[test]
fn test_try_direct_with_foreign_receiver() {
    let student = Student::default();
    let result = EntityCopier::<Person>::try_direct(&student);

    assert!(matches!(result, Err(EntityError::Configuration { .. })));
}

// =============================================================================
// Concurrency
// =============================================================================

#[test]
fn test_concurrent_copies_of_one_source() {
    init_tracing();
    let person = Person::default().set_name("Shared".to_string()).unwrap();

    let results: Vec<Person> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|age| {
                let person = &person;
                scope.spawn(move || person.set_age(age).unwrap())
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect()
    });

    for (age, result) in (0..).zip(&results) {
        assert_eq!(result.age(), age);
        assert_eq!(result.name(), "Shared");
    }
    assert_eq!(person.age(), 0);
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
