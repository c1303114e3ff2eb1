use regex::Regex;
use serde::Deserialize;

/// Business identifier of a member, e.g. `MBR-000042`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberNumber(String);

impl TryFrom<&str> for MemberNumber {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let re = Regex::new(r"^MBR-\d{6}$").unwrap();
        if !re.is_match(value) {
            anyhow::bail!("invalid member number");
        }
        Ok(Self(value.to_owned()))
    }
}

impl<'de> Deserialize<'de> for MemberNumber {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::try_from(raw.as_str()).map_err(|e| serde::de::Error::custom(e.to_string()))
    }
}

impl AsRef<str> for MemberNumber {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for MemberNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Business identifier of a savings account, e.g. `ACC-000107`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountNumber(String);

impl TryFrom<&str> for AccountNumber {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let re = Regex::new(r"^ACC-\d{6}$").unwrap();
        if !re.is_match(value) {
            anyhow::bail!("invalid account number");
        }
        Ok(Self(value.to_owned()))
    }
}

impl<'de> Deserialize<'de> for AccountNumber {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::try_from(raw.as_str()).map_err(|e| serde::de::Error::custom(e.to_string()))
    }
}

impl AsRef<str> for AccountNumber {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for AccountNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
