use crate::utils::error::{EtlError, Result};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field_name: &str, value: &str, reason: impl Into<String>) -> EtlError {
    EtlError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.trim().is_empty() {
        return Err(invalid(field_name, path, "Path cannot be empty"));
    }

    if path.contains('\0') {
        return Err(invalid(field_name, path, "Path contains null bytes"));
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(field_name, value, "Value cannot be empty or whitespace-only"));
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(invalid(
            field_name,
            &value.to_string(),
            format!("Value must be between {} and {}", min, max),
        ));
    }
    Ok(())
}

pub fn validate_s3_bucket_name(field_name: &str, bucket_name: &str) -> Result<()> {
    if bucket_name.len() < 3 || bucket_name.len() > 63 {
        return Err(invalid(
            field_name,
            bucket_name,
            "S3 bucket name must be between 3 and 63 characters",
        ));
    }

    if !bucket_name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.')
    {
        return Err(invalid(
            field_name,
            bucket_name,
            "S3 bucket name can only contain lowercase letters, numbers, hyphens, and dots",
        ));
    }

    if bucket_name.starts_with('-') || bucket_name.ends_with('-') {
        return Err(invalid(
            field_name,
            bucket_name,
            "S3 bucket name cannot start or end with a hyphen",
        ));
    }

    Ok(())
}

pub fn validate_aws_region(field_name: &str, region: &str) -> Result<()> {
    validate_non_empty_string(field_name, region)?;

    if !region
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(invalid(
            field_name,
            region,
            "AWS region can only contain lowercase letters, numbers, and hyphens",
        ));
    }

    Ok(())
}

/// 倉儲 COPY 使用的 IAM role，例如 `arn:aws:iam::123456789012:role/dwh`
pub fn validate_iam_role_arn(field_name: &str, arn: &str) -> Result<()> {
    let Some(rest) = arn.strip_prefix("arn:aws:iam::") else {
        return Err(invalid(field_name, arn, "IAM role ARN must start with 'arn:aws:iam::'"));
    };

    match rest.split_once(":role/") {
        Some((account, role)) if !account.is_empty() && !role.is_empty() => Ok(()),
        _ => Err(invalid(field_name, arn, "Expected arn:aws:iam::<account>:role/<name>")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_path() {
        assert!(validate_path("input.cities", "data/cities.csv").is_ok());
        assert!(validate_path("input.cities", "").is_err());
        assert!(validate_path("input.cities", "bad\0path").is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("processing.workers", 4usize, 1, 64).is_ok());
        assert!(validate_range("processing.workers", 0usize, 1, 64).is_err());
        assert!(validate_range("processing.workers", 65usize, 1, 64).is_err());
    }

    #[test]
    fn test_validate_s3_bucket_name() {
        assert!(validate_s3_bucket_name("s3.bucket", "travel-lake").is_ok());
        assert!(validate_s3_bucket_name("s3.bucket", "ab").is_err());
        assert!(validate_s3_bucket_name("s3.bucket", "Travel_Lake").is_err());
        assert!(validate_s3_bucket_name("s3.bucket", "-travel").is_err());
    }

    #[test]
    fn test_validate_aws_region() {
        assert!(validate_aws_region("aws.region", "us-west-2").is_ok());
        assert!(validate_aws_region("aws.region", "").is_err());
        assert!(validate_aws_region("aws.region", "US West").is_err());
    }

    #[test]
    fn test_validate_iam_role_arn() {
        assert!(validate_iam_role_arn("iam_role.arn", "arn:aws:iam::123456789012:role/dwh").is_ok());
        assert!(validate_iam_role_arn("iam_role.arn", "arn:aws:iam::123456789012:user/bob").is_err());
        assert!(validate_iam_role_arn("iam_role.arn", "role/dwh").is_err());
    }
}
