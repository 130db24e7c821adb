//! Fluent `set_*` methods over the copier.

/// Generates fluent `set_{field}` methods returning new instances.
///
/// Each generated method delegates to the entity copier using the
/// `{field}_attribute()` accessors produced by `#[derive(Entity)]`.
///
/// # Direct mode
///
/// The value type is its own copy source:
///
/// ```
/// use immutable_entity::{Entity, immutable_setters};
///
/// #[derive(Debug, Default, Entity)]
/// struct Person {
///     name: String,
///     age: u32,
/// }
///
/// immutable_setters! {
///     impl Person { name: String, age: u32 }
/// }
///
/// let person = Person::default()
///     .set_name("Joseph".to_string())
///     .and_then(|person| person.set_age(26))
///     .unwrap();
/// assert_eq!(person.age, 26);
/// ```
///
/// # Composition mode
///
/// A wrapper holds the value in a named field and implements `From` for it;
/// each setter copies the held value and wraps the result:
///
/// ```
/// use immutable_entity::{Entity, immutable_setters};
///
/// #[derive(Debug, Default, Entity)]
/// struct Student {
///     name: String,
///     age: u32,
/// }
///
/// #[derive(Debug, Default)]
/// struct ImmutableStudent {
///     student: Student,
/// }
///
/// impl From<Student> for ImmutableStudent {
///     fn from(student: Student) -> Self {
///         Self { student }
///     }
/// }
///
/// immutable_setters! {
///     impl ImmutableStudent(student: Student) { name: String, age: u32 }
/// }
///
/// let student = ImmutableStudent::default().set_name("Joseph".to_string()).unwrap();
/// assert_eq!(student.student.name, "Joseph");
/// ```
#[macro_export]
macro_rules! immutable_setters {
    (impl $entity:ident { $($field:ident : $field_type:ty),+ $(,)? }) => {
        $crate::paste::paste! {
            impl $entity {
                $(
                    #[doc = ::core::concat!(
                        "Returns a copy of `self` with `",
                        ::core::stringify!($field),
                        "` set to `value`."
                    )]
                    ///
                    /// # Errors
                    ///
                    /// Propagates any error raised by the entity copier.
                    pub fn [<set_ $field>](
                        &self,
                        value: $field_type,
                    ) -> $crate::EntityResult<Self> {
                        let attribute = Self::[<$field _attribute>]();
                        $crate::ImmutableEntity::set_field(self, &attribute, value)
                    }
                )+
            }
        }
    };
    (
        impl $wrapper:ident ( $holder:ident : $entity:ty )
        { $($field:ident : $field_type:ty),+ $(,)? }
    ) => {
        $crate::paste::paste! {
            impl $wrapper {
                $(
                    #[doc = ::core::concat!(
                        "Returns a new wrapper whose value has `",
                        ::core::stringify!($field),
                        "` set to `value`."
                    )]
                    ///
                    /// # Errors
                    ///
                    /// Propagates any error raised by the entity copier.
                    pub fn [<set_ $field>](
                        &self,
                        value: $field_type,
                    ) -> $crate::EntityResult<Self> {
                        $crate::EntityCopier::composing(&self.$holder)
                            .set_field(&<$entity>::[<$field _attribute>](), value)
                            .map(<Self as ::core::convert::From<$entity>>::from)
                    }
                )+
            }
        }
    };
}
