use crate::{
    booking::Booking,
    date::{format_date, format_timestamp},
    participant::Participant,
    shared::entity::ID,
    slot::Slot,
};
use chrono::NaiveDate;
use chrono_tz::Tz;

pub const EXPORT_COLUMNS: [&str; 12] = [
    "participant_id",
    "name",
    "service",
    "site",
    "date",
    "start_time",
    "end_time",
    "location",
    "status",
    "positioned_by",
    "internal_actor",
    "booked_at",
];

/// One line of a campaign's booking export
#[derive(Debug, Clone, PartialEq)]
pub struct BookingExportRow {
    pub participant_id: ID,
    pub name: String,
    pub service: String,
    pub site: Option<String>,
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub location: String,
    pub status: String,
    pub positioned_by: String,
    pub internal_actor: Option<ID>,
    pub booked_at: String,
}

impl BookingExportRow {
    pub fn new(booking: &Booking, participant: &Participant, slot: &Slot, tz: &Tz) -> Self {
        Self {
            participant_id: participant.id,
            name: participant.display_name.clone(),
            service: participant.service.clone(),
            site: participant.site.clone(),
            date: slot.date,
            start_time: slot.start_time.format("%H:%M").to_string(),
            end_time: slot.end_time.format("%H:%M").to_string(),
            location: slot.location.clone(),
            status: booking.status.to_string(),
            positioned_by: booking.positioning.kind().to_string(),
            internal_actor: booking.positioning.internal_actor().copied(),
            booked_at: format_timestamp(booking.created, tz),
        }
    }

    /// Values in `EXPORT_COLUMNS` order
    pub fn fields(&self) -> Vec<String> {
        vec![
            self.participant_id.to_string(),
            self.name.clone(),
            self.service.clone(),
            self.site.clone().unwrap_or_default(),
            format_date(&self.date),
            self.start_time.clone(),
            self.end_time.clone(),
            self.location.clone(),
            self.status.clone(),
            self.positioned_by.clone(),
            self.internal_actor
                .map(|id| id.to_string())
                .unwrap_or_default(),
            self.booked_at.clone(),
        ]
    }
}

pub fn export_filename(campaign_id: &ID, today: &NaiveDate) -> String {
    format!("bookings_{}_{}.csv", campaign_id, format_date(today))
}

fn escape_csv_field(field: &str) -> String {
    if field.contains(|c| c == ',' || c == '"' || c == '\n' || c == '\r') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Renders the rows as CSV with a header line, rows are written in the order given
pub fn to_csv(rows: &[BookingExportRow]) -> String {
    let mut out = EXPORT_COLUMNS.join(",");
    out.push_str("\r\n");
    for row in rows {
        let line = row
            .fields()
            .iter()
            .map(|f| escape_csv_field(f))
            .collect::<Vec<_>>()
            .join(",");
        out.push_str(&line);
        out.push_str("\r\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{booking::Positioning, slot::TimeWindow};
    use chrono::NaiveTime;
    use chrono_tz::UTC;

    #[test]
    fn renders_rows_in_column_order() {
        let mut participant = Participant::new("Dupont, Jean", "IT");
        participant.site = Some("Paris".into());
        let slot = Slot::new(
            ID::new(),
            NaiveDate::from_ymd_opt(2024, 3, 12).unwrap(),
            TimeWindow::new(
                NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
                NaiveTime::from_hms_opt(14, 30, 0).unwrap(),
            ),
            2,
            "Salle \"A\"",
            None,
        );
        let actor_id = ID::new();
        let booking = Booking::new(
            participant.id,
            &slot,
            Positioning::Coordinator { actor_id },
            0,
        );

        let row = BookingExportRow::new(&booking, &participant, &slot, &UTC);
        assert_eq!(row.fields().len(), EXPORT_COLUMNS.len());

        let csv = to_csv(&[row]);
        let lines = csv.split("\r\n").collect::<Vec<_>>();
        assert_eq!(lines[0], EXPORT_COLUMNS.join(","));
        assert_eq!(
            lines[1],
            format!(
                "{},\"Dupont, Jean\",IT,Paris,2024-03-12,14:00,14:30,\"Salle \"\"A\"\"\",confirmed,coordinator,{},1970-01-01T00:00:00+00:00",
                participant.id, actor_id
            )
        );
    }

    #[test]
    fn filename_pattern() {
        let id = ID::new();
        let today = NaiveDate::from_ymd_opt(2024, 3, 8).unwrap();
        assert_eq!(
            export_filename(&id, &today),
            format!("bookings_{}_2024-03-08.csv", id)
        );
    }
}
