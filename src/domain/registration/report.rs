//! Admin report: company filter and CSV export

use chrono::NaiveDate;

use super::entity::Registration;

/// Header row of the CSV export
pub const CSV_HEADER: &str = "Full Name,Corporate Email,Employee ID,Company Name,T-shirt Size,Emergency Contact,Emergency Phone,Registration Date,Status";

/// Case-insensitive substring match on company name
///
/// A blank query keeps every row. Order is preserved.
pub fn filter_by_company<'a>(rows: &'a [Registration], query: &str) -> Vec<&'a Registration> {
    if query.trim().is_empty() {
        return rows.iter().collect();
    }

    let needle = query.to_lowercase();
    rows.iter()
        .filter(|row| row.company_name().to_lowercase().contains(&needle))
        .collect()
}

/// Render rows as CSV, one line per row after the header
pub fn export_csv<'a, I>(rows: I) -> String
where
    I: IntoIterator<Item = &'a Registration>,
{
    let mut out = String::from(CSV_HEADER);

    for row in rows {
        let details = row.details();
        let fields = [
            quote(&details.full_name),
            quote(&details.corporate_email),
            quote(&details.employee_id),
            quote(&details.company_name),
            details.tshirt_size.as_str().to_string(),
            quote(&details.emergency_contact),
            quote(&details.emergency_phone),
            short_date(row.registration_date().date_naive()),
            row.status().as_str().to_string(),
        ];

        out.push('\n');
        out.push_str(&fields.join(","));
    }

    out
}

/// `registrations_<YYYY-MM-DD>.csv`
pub fn export_filename(date: NaiveDate) -> String {
    format!("registrations_{}.csv", date.format("%Y-%m-%d"))
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

// en-US short date, no zero padding
fn short_date(date: NaiveDate) -> String {
    date.format("%-m/%-d/%Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::registration::entity::{
        NewRegistration, RegistrationDetails, RegistrationId, TshirtSize,
    };
    use crate::domain::user::UserId;
    use chrono::{TimeZone, Utc};

    fn row(full_name: &str, company: &str, day: u32) -> Registration {
        let date = Utc.with_ymd_and_hms(2024, 3, day, 9, 30, 0).unwrap();
        let details = RegistrationDetails {
            full_name: full_name.to_string(),
            corporate_email: "runner@acme.com".to_string(),
            employee_id: "E-7".to_string(),
            company_name: company.to_string(),
            tshirt_size: TshirtSize::Large,
            emergency_contact: "Pat Smith".to_string(),
            emergency_phone: "5550001111".to_string(),
        };
        let new = NewRegistration::confirmed(UserId::generate(), details, date);
        Registration::from_new(RegistrationId::generate(), new, date)
    }

    #[test]
    fn test_filter_is_case_insensitive_and_ordered() {
        let rows = vec![row("A", "Acme", 3), row("B", "Beta", 2), row("C", "ACME Labs", 1)];

        let filtered = filter_by_company(&rows, "acme");
        let names: Vec<_> = filtered.iter().map(|r| r.full_name()).collect();

        assert_eq!(names, vec!["A", "C"]);
    }

    #[test]
    fn test_blank_query_keeps_everything() {
        let rows = vec![row("A", "Acme", 3), row("B", "Beta", 2)];

        assert_eq!(filter_by_company(&rows, "").len(), 2);
        assert_eq!(filter_by_company(&rows, "   ").len(), 2);
    }

    #[test]
    fn test_filter_matches_company_only() {
        let rows = vec![row("Acme Fan", "Beta", 3)];
        assert!(filter_by_company(&rows, "acme").is_empty());
    }

    #[test]
    fn test_filtered_export_has_header_and_one_line() {
        let rows = vec![row("A", "Acme", 3), row("B", "Beta", 2), row("C", "ACME Labs", 1)];
        let filtered = filter_by_company(&rows, "beta");

        let csv = export_csv(filtered);
        let lines: Vec<_> = csv.lines().collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(
            lines[1],
            "\"B\",\"runner@acme.com\",\"E-7\",\"Beta\",L,\"Pat Smith\",\"5550001111\",3/2/2024,confirmed"
        );
    }

    #[test]
    fn test_filtered_two_row_export() {
        let rows = vec![
            row("Ann Lee", "Acme", 3),
            row("B", "Beta", 2),
            row("Cy Park", "ACME Labs", 1),
        ];
        let filtered = filter_by_company(&rows, "acme");

        let csv = export_csv(filtered);
        let lines: Vec<_> = csv.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(CSV_HEADER.split(',').count(), 9);
        assert!(lines[1].starts_with("\"Ann Lee\","));
        assert!(lines[2].starts_with("\"Cy Park\","));
    }

    #[test]
    fn test_embedded_quotes_are_doubled() {
        let rows = vec![row("Jo \"Speedy\" Lee", "Acme", 14)];
        let csv = export_csv(&rows);

        assert!(csv.contains("\"Jo \"\"Speedy\"\" Lee\""));
        assert!(csv.contains(",3/14/2024,"));
    }

    #[test]
    fn test_empty_export_is_header_only() {
        assert_eq!(export_csv(&Vec::<Registration>::new()), CSV_HEADER);
    }

    #[test]
    fn test_export_filename() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert_eq!(export_filename(date), "registrations_2024-05-01.csv");
    }
}
