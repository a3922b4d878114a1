use crate::prices::PriceTable;

/// Daytime window for the day/night split policy, `[7, 23)`.
const DAY_START_HOUR: u8 = 7;
const DAY_END_HOUR: u8 = 23;

/// Longest tolerated run of consecutive OFF hours at night.
const MAX_NIGHT_RUN: usize = 5;

/// Adjacency rule applied while accepting blackout hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlackoutPolicy {
    /// No two OFF hours may be adjacent (mod 24). The load is never
    /// shed for more than one hour at a stretch.
    Isolated,
    /// Daytime hours follow the isolation rule; nighttime hours may
    /// form runs of up to [`MAX_NIGHT_RUN`] consecutive OFF hours.
    DayNightSplit,
}

/// The subset of a day's hours chosen as OFF, with the price that put
/// each hour there. Recomputed whenever a new price table arrives and
/// replaced as a whole.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlackoutSet {
    off_hours: [Option<f64>; 24],
}

impl BlackoutSet {
    /// Greedy selection: rank hours at or above `price_floor` most
    /// expensive first (ties by hour ascending, so the result is
    /// deterministic) and accept until `target_count` hours pass the
    /// policy or the list runs out. Never pads with ineligible hours.
    pub fn select(
        table: &PriceTable,
        price_floor: f64,
        target_count: usize,
        policy: BlackoutPolicy,
    ) -> Self {
        let mut ranked: Vec<(u8, f64)> = table
            .iter()
            .filter(|&(_, price)| price >= price_floor)
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

        let mut set = Self::default();
        let mut accepted = 0;
        for (hour, price) in ranked {
            if accepted >= target_count {
                break;
            }
            if set.accepts(hour, policy) {
                set.off_hours[hour as usize] = Some(price);
                accepted += 1;
            }
        }
        set
    }

    pub fn contains(&self, hour: u8) -> bool {
        self.price(hour).is_some()
    }

    pub fn price(&self, hour: u8) -> Option<f64> {
        self.off_hours.get(hour as usize).copied().flatten()
    }

    pub fn len(&self) -> usize {
        self.off_hours.iter().filter(|price| price.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Accepted hours in ascending order.
    pub fn hours(&self) -> impl Iterator<Item = u8> + '_ {
        self.iter().map(|(hour, _)| hour)
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, f64)> + '_ {
        self.off_hours
            .iter()
            .enumerate()
            .filter_map(|(hour, price)| price.map(|p| (hour as u8, p)))
    }

    fn accepts(&self, hour: u8, policy: BlackoutPolicy) -> bool {
        match policy {
            BlackoutPolicy::Isolated => self.neighbors_free(hour),
            BlackoutPolicy::DayNightSplit => {
                if is_daytime(hour) {
                    self.neighbors_free(hour)
                } else {
                    self.night_run_within_limit(hour)
                }
            }
        }
    }

    fn neighbors_free(&self, hour: u8) -> bool {
        let prev = (hour + 23) % 24;
        let next = (hour + 1) % 24;
        !self.contains(prev) && !self.contains(next)
    }

    /// Run-length check for nighttime hours. Scans down while above
    /// hour 0 and up while below the daytime boundary, so a night run
    /// never wraps across midnight through hour 23.
    fn night_run_within_limit(&self, hour: u8) -> bool {
        let mut run = 1usize;
        let mut h = hour;
        while h > 0 && self.contains(h - 1) {
            run += 1;
            if run > MAX_NIGHT_RUN {
                return false;
            }
            h -= 1;
        }
        h = hour;
        while h < DAY_START_HOUR && self.contains(h + 1) {
            run += 1;
            if run > MAX_NIGHT_RUN {
                return false;
            }
            h += 1;
        }
        true
    }

    /// Full-day status broadcast sent after every successful plan
    /// computation: one line per known hour with the relay state, the
    /// price, and why the hour ended up ON or OFF.
    pub fn plan_report(
        &self,
        day_label: &str,
        table: &PriceTable,
        price_floor: f64,
        policy: BlackoutPolicy,
    ) -> String {
        let mut out = format!("{day_label} power schedule:\n");
        for (hour, price) in table.iter() {
            let is_off = self.contains(hour);
            let state = if is_off { "OFF" } else { "ON " };
            let reason = self.hour_reason(hour, price, price_floor, policy);
            out.push_str(&format!("{hour:02}:00 {state} {price:.2} SEK/kWh [{reason}]\n"));
        }
        out
    }

    fn hour_reason(
        &self,
        hour: u8,
        price: f64,
        price_floor: f64,
        policy: BlackoutPolicy,
    ) -> &'static str {
        if price < price_floor {
            return "below price floor";
        }
        if self.contains(hour) {
            return "peak price hour";
        }
        let isolated = policy == BlackoutPolicy::Isolated || is_daytime(hour);
        if isolated {
            if !self.neighbors_free(hour) {
                "max 1h off during day"
            } else {
                "cheaper than peaks"
            }
        } else {
            // Length of the accepted run ending just below this hour.
            let mut run = 1usize;
            let mut h = hour;
            while h > 0 && self.contains(h - 1) {
                run += 1;
                h -= 1;
            }
            if run >= MAX_NIGHT_RUN {
                "max 5h off at night"
            } else {
                "cheaper than peaks"
            }
        }
    }
}

fn is_daytime(hour: u8) -> bool {
    (DAY_START_HOUR..DAY_END_HOUR).contains(&hour)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prices::PriceSample;
    use pretty_assertions::assert_eq;

    fn table(entries: &[(u8, f64)]) -> PriceTable {
        let samples: Vec<PriceSample> = entries
            .iter()
            .map(|&(hour, price)| PriceSample {
                time_start: format!("2026-08-25T{hour:02}:00:00+02:00"),
                price,
            })
            .collect();
        PriceTable::from_samples(&samples).unwrap()
    }

    fn hours(set: &BlackoutSet) -> Vec<u8> {
        set.hours().collect()
    }

    #[test]
    fn picks_most_expensive_eligible_hours() {
        let table = table(&[(0, 0.05), (1, 0.50), (2, 0.52), (3, 0.10), (5, 0.20)]);
        let set = BlackoutSet::select(&table, 0.09, 2, BlackoutPolicy::Isolated);

        // Hour 2 wins outright; hours 1 and 3 are rejected as adjacent
        // to it, so the next eligible non-adjacent hour is 5.
        assert_eq!(hours(&set), vec![2, 5]);
    }

    #[test]
    fn isolation_never_accepts_adjacent_hours() {
        let table = table(&[
            (10, 1.0),
            (11, 0.9),
            (12, 0.8),
            (13, 0.7),
            (14, 0.6),
        ]);
        let set = BlackoutSet::select(&table, 0.09, 5, BlackoutPolicy::Isolated);

        assert_eq!(hours(&set), vec![10, 12, 14]);
        for h1 in set.hours() {
            for h2 in set.hours() {
                if h1 != h2 {
                    assert_ne!((h1 as i8 - h2 as i8).rem_euclid(24), 1);
                }
            }
        }
    }

    #[test]
    fn isolation_wraps_around_midnight() {
        let table = table(&[(23, 1.0), (0, 0.9), (12, 0.5)]);
        let set = BlackoutSet::select(&table, 0.09, 3, BlackoutPolicy::Isolated);

        // Hour 0 is adjacent to hour 23 mod 24.
        assert_eq!(hours(&set), vec![12, 23]);
    }

    #[test]
    fn never_accepts_below_price_floor() {
        let table = table(&[(3, 0.05), (9, 0.08), (15, 0.30)]);
        let set = BlackoutSet::select(&table, 0.09, 3, BlackoutPolicy::Isolated);

        assert_eq!(hours(&set), vec![15]);
    }

    #[test]
    fn returns_fewer_when_not_enough_eligible() {
        let table = table(&[(4, 0.50), (5, 0.40)]);
        let set = BlackoutSet::select(&table, 0.09, 8, BlackoutPolicy::Isolated);

        // Hour 5 is adjacent to the accepted hour 4.
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn zero_target_and_empty_table_give_empty_sets() {
        let populated = table(&[(4, 0.50)]);
        assert!(BlackoutSet::select(&populated, 0.09, 0, BlackoutPolicy::Isolated).is_empty());

        let empty = PriceTable::default();
        assert!(BlackoutSet::select(&empty, 0.09, 8, BlackoutPolicy::Isolated).is_empty());
    }

    #[test]
    fn ties_break_by_hour_ascending() {
        let table = table(&[(12, 1.0), (10, 1.0)]);
        let set = BlackoutSet::select(&table, 0.09, 1, BlackoutPolicy::Isolated);

        assert_eq!(hours(&set), vec![10]);
    }

    #[test]
    fn selection_is_deterministic() {
        let table = table(&[(0, 0.05), (1, 0.50), (2, 0.52), (3, 0.10), (8, 0.3), (20, 0.3)]);
        let first = BlackoutSet::select(&table, 0.09, 4, BlackoutPolicy::DayNightSplit);
        let second = BlackoutSet::select(&table, 0.09, 4, BlackoutPolicy::DayNightSplit);

        assert_eq!(first, second);
    }

    #[test]
    fn night_runs_are_capped_at_five_hours() {
        let table = table(&[
            (0, 2.0),
            (1, 1.9),
            (2, 1.8),
            (3, 1.7),
            (4, 1.6),
            (5, 1.5),
            (6, 1.4),
        ]);
        let set = BlackoutSet::select(&table, 0.09, 8, BlackoutPolicy::DayNightSplit);

        // Hours 0-4 form the maximal run; hour 5 would stretch it to
        // six, so the next acceptable hour is 6.
        assert_eq!(hours(&set), vec![0, 1, 2, 3, 4, 6]);
    }

    #[test]
    fn daytime_hours_stay_isolated_under_day_night_split() {
        let table = table(&[(10, 1.0), (11, 0.9), (12, 0.8)]);
        let set = BlackoutSet::select(&table, 0.09, 3, BlackoutPolicy::DayNightSplit);

        assert_eq!(hours(&set), vec![10, 12]);
    }

    #[test]
    fn night_run_does_not_wrap_past_midnight() {
        let table = table(&[
            (23, 2.0),
            (0, 1.9),
            (1, 1.8),
            (2, 1.7),
            (3, 1.6),
            (4, 1.5),
        ]);
        let set = BlackoutSet::select(&table, 0.09, 6, BlackoutPolicy::DayNightSplit);

        // Hour 23 sits on the far side of midnight and is not counted
        // into the 0-4 run, so all six hours are accepted.
        assert_eq!(hours(&set), vec![0, 1, 2, 3, 4, 23]);
    }

    #[test]
    fn plan_report_explains_every_known_hour() {
        let table = table(&[(0, 0.05), (1, 0.50), (2, 0.52), (5, 0.20)]);
        let set = BlackoutSet::select(&table, 0.09, 2, BlackoutPolicy::DayNightSplit);
        let report = set.plan_report("Today", &table, 0.09, BlackoutPolicy::DayNightSplit);

        assert!(report.starts_with("Today power schedule:\n"));
        assert!(report.contains("00:00 ON  0.05 SEK/kWh [below price floor]"));
        assert!(report.contains("02:00 OFF 0.52 SEK/kWh [peak price hour]"));
        // One line per known hour, plus the heading.
        assert_eq!(report.lines().count(), 5);
    }
}
