use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Where uploaded media assets live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetStoreBackend {
    /// Cloudinary-compatible media host reached over HTTPS
    Cloudinary,
    /// Local filesystem, for development and tests
    Local,
}

impl FromStr for AssetStoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cloudinary" => Ok(AssetStoreBackend::Cloudinary),
            "local" => Ok(AssetStoreBackend::Local),
            _ => Err(anyhow::anyhow!("Invalid asset store backend: {}", s)),
        }
    }
}

impl Display for AssetStoreBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            AssetStoreBackend::Cloudinary => write!(f, "cloudinary"),
            AssetStoreBackend::Local => write!(f, "local"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_from_str() {
        assert_eq!(
            " Cloudinary ".parse::<AssetStoreBackend>().unwrap(),
            AssetStoreBackend::Cloudinary
        );
        assert_eq!(
            "local".parse::<AssetStoreBackend>().unwrap(),
            AssetStoreBackend::Local
        );
        assert!("s3".parse::<AssetStoreBackend>().is_err());
    }

    #[test]
    fn test_backend_display_matches_parse() {
        for backend in [AssetStoreBackend::Cloudinary, AssetStoreBackend::Local] {
            assert_eq!(
                backend.to_string().parse::<AssetStoreBackend>().unwrap(),
                backend
            );
        }
    }
}
