use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// The eight mutually exclusive shapes a schema can take.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Form {
    Empty,
    Type,
    Enum,
    Elements,
    Properties,
    Values,
    Discriminator,
    Ref,
}

impl Default for Form {
    fn default() -> Self {
        Form::Empty
    }
}

impl Form {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Type => "type",
            Self::Enum => "enum",
            Self::Elements => "elements",
            Self::Properties => "properties",
            Self::Values => "values",
            Self::Discriminator => "discriminator",
            Self::Ref => "ref",
        }
    }

    /// The schema path segment that hook errors and supplemental validation
    /// errors of this form are reported under, if any.
    pub fn keyword(self) -> Option<&'static str> {
        match self {
            Self::Empty | Self::Properties => None,
            Self::Type => Some("type"),
            Self::Enum => Some("enum"),
            Self::Elements => Some("elements"),
            Self::Values => Some("values"),
            Self::Discriminator => Some("discriminator"),
            Self::Ref => Some("ref"),
        }
    }
}

impl fmt::Display for Form {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeName {
    Boolean,
    Float32,
    Float64,
    Int8,
    Uint8,
    Int16,
    Uint16,
    Int32,
    Uint32,
    String,
    Timestamp,
}

impl FromStr for TypeName {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "boolean" => Ok(Self::Boolean),
            "float32" => Ok(Self::Float32),
            "float64" => Ok(Self::Float64),
            "int8" => Ok(Self::Int8),
            "uint8" => Ok(Self::Uint8),
            "int16" => Ok(Self::Int16),
            "uint16" => Ok(Self::Uint16),
            "int32" => Ok(Self::Int32),
            "uint32" => Ok(Self::Uint32),
            "string" => Ok(Self::String),
            "timestamp" => Ok(Self::Timestamp),
            _ => Err(()),
        }
    }
}

impl TypeName {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::Int8 => "int8",
            Self::Uint8 => "uint8",
            Self::Int16 => "int16",
            Self::Uint16 => "uint16",
            Self::Int32 => "int32",
            Self::Uint32 => "uint32",
            Self::String => "string",
            Self::Timestamp => "timestamp",
        }
    }

    /// Inclusive bounds of the integer types.
    pub fn integer_range(self) -> Option<(f64, f64)> {
        match self {
            Self::Int8 => Some((-128.0, 127.0)),
            Self::Uint8 => Some((0.0, 255.0)),
            Self::Int16 => Some((-32768.0, 32767.0)),
            Self::Uint16 => Some((0.0, 65535.0)),
            Self::Int32 => Some((-2147483648.0, 2147483647.0)),
            Self::Uint32 => Some((0.0, 4294967295.0)),
            _ => None,
        }
    }

    pub fn is_integer(self) -> bool {
        self.integer_range().is_some()
    }

    pub fn is_numeric(self) -> bool {
        self.is_integer() || self == Self::Float32 || self == Self::Float64
    }

    /// Whether values of this type are ordered, so that minimum/maximum
    /// checks apply.
    pub fn is_boundable(self) -> bool {
        self.is_numeric() || self == Self::Timestamp
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
