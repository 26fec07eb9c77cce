//! Custom serde helpers for wire and log formats.

/// Deserializes a `u64` sent either as a JSON number or a decimal string.
///
/// Gas estimates come back as numbers from some endpoints and as strings
/// from others.
pub mod u64_or_string {
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(u64),
        Str(String),
    }

    pub fn serialize<S>(value: &u64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(*value)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u64, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Raw::deserialize(deserializer)? {
            Raw::Num(n) => Ok(n),
            Raw::Str(s) => s
                .trim()
                .parse::<u64>()
                .map_err(|e| serde::de::Error::custom(format!("Invalid integer '{}': {}", s, e))),
        }
    }
}

/// Deserializes an explicit JSON `null` as the type's default.
///
/// Use with `#[serde(default, deserialize_with = "...")]` so that a missing
/// field and a `null` field decode the same way.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: serde::Deserialize<'de> + Default,
{
    use serde::Deserialize;
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Serializes a `U256` as a base-10 JSON string; accepts a string or a number.
#[cfg(feature = "chain")]
pub mod u256_decimal {
    use alloy::primitives::U256;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(u64),
        Str(String),
    }

    pub fn serialize<S>(value: &U256, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<U256, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Raw::deserialize(deserializer)? {
            Raw::Num(n) => Ok(U256::from(n)),
            Raw::Str(s) => U256::from_str_radix(s.trim(), 10)
                .map_err(|e| serde::de::Error::custom(format!("Invalid U256 '{}': {}", s, e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Gas {
        #[serde(with = "super::u64_or_string")]
        gas: u64,
    }

    #[test]
    fn test_u64_from_number_or_string() {
        let a: Gas = serde_json::from_str(r#"{"gas": 210000}"#).unwrap();
        let b: Gas = serde_json::from_str(r#"{"gas": "210000"}"#).unwrap();
        assert_eq!(a, b);
        assert_eq!(serde_json::to_string(&a).unwrap(), r#"{"gas":210000}"#);
        assert!(serde_json::from_str::<Gas>(r#"{"gas": "0x10"}"#).is_err());
    }

    #[test]
    fn test_null_as_default() {
        #[derive(Debug, Deserialize)]
        struct Reasons {
            #[serde(default, deserialize_with = "super::null_as_default")]
            reasons: Vec<String>,
        }

        let null: Reasons = serde_json::from_str(r#"{"reasons": null}"#).unwrap();
        let missing: Reasons = serde_json::from_str("{}").unwrap();
        let set: Reasons = serde_json::from_str(r#"{"reasons": ["a"]}"#).unwrap();
        assert!(null.reasons.is_empty());
        assert!(missing.reasons.is_empty());
        assert_eq!(set.reasons, vec!["a"]);
    }

    #[cfg(feature = "chain")]
    #[test]
    fn test_u256_decimal_string() {
        use alloy::primitives::U256;

        #[derive(Debug, Serialize, Deserialize, PartialEq)]
        struct Value {
            #[serde(with = "super::u256_decimal")]
            value: U256,
        }

        let big = Value {
            value: U256::from(10u64).pow(U256::from(30u64)),
        };
        let json = serde_json::to_string(&big).unwrap();
        assert_eq!(json, r#"{"value":"1000000000000000000000000000000"}"#);
        assert_eq!(serde_json::from_str::<Value>(&json).unwrap(), big);

        let small: Value = serde_json::from_str(r#"{"value": 5}"#).unwrap();
        assert_eq!(small.value, U256::from(5u64));
    }
}
