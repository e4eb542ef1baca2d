//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different entity types. All Wayside entity
//! IDs are UUIDs (the hosted auth subsystem issues UUID principal IDs, and
//! every table keys on UUID primary keys).

use uuid::Uuid;

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around [`Uuid`] with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `generate()`, `as_uuid()`
/// - `From<Uuid>` and `Into<Uuid>` implementations
/// - `FromStr` parsing
/// - `sqlx` `Type`, `Encode`, and `Decode` implementations (with `postgres` feature)
///
/// # Example
///
/// ```rust
/// # use wayside_core::define_id;
/// define_id!(ContactId);
/// define_id!(EventId);
///
/// let contact_id = ContactId::generate();
/// let event_id = EventId::generate();
///
/// // These are different types, so this won't compile:
/// // let _: ContactId = event_id;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(::uuid::Uuid);

        impl $name {
            /// Create an ID from an existing UUID.
            #[must_use]
            pub const fn new(id: ::uuid::Uuid) -> Self {
                Self(id)
            }

            /// Generate a fresh random (v4) ID.
            #[must_use]
            pub fn generate() -> Self {
                Self(::uuid::Uuid::new_v4())
            }

            /// Get the underlying UUID.
            #[must_use]
            pub const fn as_uuid(&self) -> ::uuid::Uuid {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = ::uuid::Error;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                Ok(Self(s.parse()?))
            }
        }

        impl From<::uuid::Uuid> for $name {
            fn from(id: ::uuid::Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for ::uuid::Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Type<::sqlx::Postgres> for $name {
            fn type_info() -> ::sqlx::postgres::PgTypeInfo {
                <::uuid::Uuid as ::sqlx::Type<::sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &::sqlx::postgres::PgTypeInfo) -> bool {
                <::uuid::Uuid as ::sqlx::Type<::sqlx::Postgres>>::compatible(ty)
            }
        }

        #[cfg(feature = "postgres")]
        impl<'r> ::sqlx::Decode<'r, ::sqlx::Postgres> for $name {
            fn decode(
                value: ::sqlx::postgres::PgValueRef<'r>,
            ) -> ::core::result::Result<Self, ::sqlx::error::BoxDynError> {
                let id = <::uuid::Uuid as ::sqlx::Decode<::sqlx::Postgres>>::decode(value)?;
                Ok(Self(id))
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Encode<'_, ::sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut ::sqlx::postgres::PgArgumentBuffer,
            ) -> ::std::result::Result<::sqlx::encode::IsNull, ::sqlx::error::BoxDynError> {
                <::uuid::Uuid as ::sqlx::Encode<::sqlx::Postgres>>::encode_by_ref(&self.0, buf)
            }
        }
    };
}

// Define standard entity IDs.
//
// IdentityId is the auth subsystem's principal ID; it is not a table key of
// ours, but it is a foreign key into `mobile_app_users.auth_user_id`.
define_id!(IdentityId);
define_id!(ContactId);
define_id!(AppUserId);
define_id!(MemberId);
define_id!(GroupId);
define_id!(DiscipleshipGroupId);
define_id!(MembershipId);
define_id!(EventId);
define_id!(RegistrationId);
define_id!(AttendanceId);
define_id!(PrayerRequestId);
define_id!(TransactionId);
define_id!(SermonId);
define_id!(DriverId);
define_id!(TransportRequestId);
define_id!(AdminUserId);

impl IdentityId {
    /// Reinterpret this identity as a contact ID.
    ///
    /// Last-resort fallback in contact resolution: some early records were
    /// seeded with the auth principal ID reused as the contact primary key.
    #[must_use]
    pub const fn as_contact_id(&self) -> ContactId {
        ContactId::new(self.as_uuid())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn generate_is_unique() {
        assert_ne!(ContactId::generate(), ContactId::generate());
    }

    #[test]
    fn roundtrip_uuid() {
        let raw = Uuid::new_v4();
        let id = ContactId::new(raw);
        assert_eq!(id.as_uuid(), raw);
        assert_eq!(Uuid::from(id), raw);
    }

    #[test]
    fn parse_from_str() {
        let raw = Uuid::new_v4();
        let id: EventId = raw.to_string().parse().unwrap();
        assert_eq!(id.as_uuid(), raw);
    }

    #[test]
    fn serde_is_transparent() {
        let id = ContactId::generate();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
        let back: ContactId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn identity_as_contact_preserves_uuid() {
        let identity = IdentityId::generate();
        assert_eq!(identity.as_contact_id().as_uuid(), identity.as_uuid());
    }
}
