use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The five inputs of the contact form, in the order they are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    FirstName,
    LastName,
    Email,
    Phone,
    Message,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::FirstName,
        Field::LastName,
        Field::Email,
        Field::Phone,
        Field::Message,
    ];

    /// Key used both by the form inputs and the webhook body.
    pub fn name(self) -> &'static str {
        match self {
            Field::FirstName => "fname",
            Field::LastName => "lname",
            Field::Email => "email",
            Field::Phone => "tel",
            Field::Message => "message",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::FirstName => "First name",
            Field::LastName => "Last name",
            Field::Email => "Email",
            Field::Phone => "Phone number",
            Field::Message => "Message",
        }
    }

    pub fn is_optional(self) -> bool {
        matches!(self, Field::Phone)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown form field `{0}`")]
pub struct UnknownField(pub String);

impl FromStr for Field {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .into_iter()
            .find(|f| f.name() == s)
            .ok_or_else(|| UnknownField(s.to_string()))
    }
}

/// Field values as posted to the webhook.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactFields {
    pub fname: String,
    pub lname: String,
    pub email: String,
    pub tel: String,
    pub message: String,
}

impl ContactFields {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::FirstName => &self.fname,
            Field::LastName => &self.lname,
            Field::Email => &self.email,
            Field::Phone => &self.tel,
            Field::Message => &self.message,
        }
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let slot = match field {
            Field::FirstName => &mut self.fname,
            Field::LastName => &mut self.lname,
            Field::Email => &mut self.email,
            Field::Phone => &mut self.tel,
            Field::Message => &mut self.message,
        };
        *slot = value.into();
    }

    pub fn is_empty(&self) -> bool {
        Field::ALL.into_iter().all(|f| self.get(f).is_empty())
    }
}

/// Successful delivery. The response body is never looked at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ack {
    pub status: u16,
}
