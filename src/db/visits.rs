//! Page-visit counters backing the dashboard.

use anyhow::Result;
use rusqlite::params;

use super::Database;

/// User agents are truncated to keep rows small; the value is only ever
/// eyeballed, never parsed.
const MAX_USER_AGENT_LEN: usize = 190;

impl Database {
    pub fn record_visit(&self, page: &str, user_agent: Option<&str>) -> Result<()> {
        let ua = user_agent.map(|ua| {
            if ua.len() <= MAX_USER_AGENT_LEN {
                ua
            } else {
                let mut end = MAX_USER_AGENT_LEN;
                while !ua.is_char_boundary(end) {
                    end -= 1;
                }
                &ua[..end]
            }
        });
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO visits (page, user_agent) VALUES (?, ?)",
            params![page, ua],
        )?;
        Ok(())
    }

    pub fn count_visits(&self) -> Result<i64> {
        let conn = self.conn()?;
        Ok(conn.query_row("SELECT COUNT(*) FROM visits", [], |row| row.get(0))?)
    }
}

#[cfg(test)]
mod tests {
    use crate::db::test_util::open_temp;

    #[test]
    fn visits_accumulate() {
        let (_dir, db) = open_temp();
        db.record_visit("/", Some("Mozilla/5.0")).unwrap();
        db.record_visit("/tours", None).unwrap();
        assert_eq!(db.count_visits().unwrap(), 2);
    }

    #[test]
    fn long_user_agents_are_truncated() {
        let (_dir, db) = open_temp();
        let ua = "x".repeat(500);
        db.record_visit("/", Some(&ua)).unwrap();

        let conn = db.conn().unwrap();
        let stored: String = conn
            .query_row("SELECT user_agent FROM visits", [], |row| row.get(0))
            .unwrap();
        assert_eq!(stored.len(), 190);
    }
}
