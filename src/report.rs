//! Eligibility report materialization

use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::models::EligibilityRecord;
use crate::Result;

/// Flat row shape of the output file
#[derive(Debug, Serialize)]
struct ReportRow<'a> {
    #[serde(rename = "Username")]
    username: &'a str,
    #[serde(rename = "Display Name")]
    display_name: &'a str,
    #[serde(rename = "FID")]
    fid: u64,
    #[serde(rename = "Wallet Address")]
    wallet_address: &'a str,
    #[serde(rename = "Reason")]
    reason: &'static str,
    #[serde(rename = "Follower Count")]
    follower_count: u64,
}

/// Write the eligibility list to a CSV file at `path`.
///
/// # Errors
/// Propagates file and serialization errors; losing the report means
/// losing the end product, so the caller aborts the run.
pub fn write_eligibility_report<P: AsRef<Path>>(
    records: &[EligibilityRecord],
    path: P,
) -> Result<usize> {
    let mut writer = csv::Writer::from_path(path.as_ref())?;

    for record in records {
        writer.serialize(ReportRow {
            username: &record.user.username,
            display_name: &record.user.display_name,
            fid: record.user.fid,
            wallet_address: &record.wallet_address,
            reason: record.reason.as_str(),
            follower_count: record.user.follower_count,
        })?;
    }
    writer.flush()?;

    info!(
        "CSV file created: {} ({} records)",
        path.as_ref().display(),
        records.len()
    );
    Ok(records.len())
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::models::CanonicalUser;
    use crate::models::EligibilityReason;
    use crate::models::VerifiedAddresses;
    use crate::models::NO_VERIFIED_ADDRESS;

    fn record(fid: u64, display_name: &str, reason: EligibilityReason) -> EligibilityRecord {
        EligibilityRecord {
            user: CanonicalUser {
                fid,
                username: format!("user{fid}"),
                display_name: display_name.to_string(),
                verified_addresses: VerifiedAddresses::default(),
                follower_count: fid * 10,
                profile_image: String::new(),
            },
            wallet_address: NO_VERIFIED_ADDRESS.to_string(),
            reason,
        }
    }

    #[test]
    fn test_writes_header_and_rows() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("eligible.csv");

        let records = vec![
            record(1, "Alice", EligibilityReason::NoAddress),
            record(2, "Bob, the builder", EligibilityReason::NoToken),
        ];
        let written = write_eligibility_report(&records, &path).unwrap();
        assert_eq!(written, 2);

        let contents = std::fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Username,Display Name,FID,Wallet Address,Reason,Follower Count"
        );
        assert_eq!(
            lines.next().unwrap(),
            format!("user1,Alice,1,{NO_VERIFIED_ADDRESS},NO_ADDRESS,10")
        );
        // A display name containing the delimiter is quoted
        assert_eq!(
            lines.next().unwrap(),
            format!("user2,\"Bob, the builder\",2,{NO_VERIFIED_ADDRESS},NO_TOKEN,20")
        );
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_unwritable_path_is_fatal() {
        let records = vec![record(1, "Alice", EligibilityReason::NoAddress)];
        let result = write_eligibility_report(&records, "/nonexistent-dir/eligible.csv");
        assert!(result.is_err());
    }
}
