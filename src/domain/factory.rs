//! Record generation for bootstrap and streaming.

use super::RecordKind;
use super::fixed::Fixed2;
use super::models::{Customer, Invoice, Loan, customer_key, invoice_key, loan_key};
use chrono::{Days, NaiveDate};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Upper bound on entries per streaming cycle, regardless of configuration.
pub const STREAM_BATCH_CEILING: usize = 10;

/// Source of records, batch sizes and record kinds for the engine.
///
/// `seq` is the 1-based business-key sequence number of the record to build.
/// `roster` is the set of known customers that invoices and loans reference;
/// it may be empty.
pub trait RecordFactory: Send {
    fn customer(&mut self, seq: u64) -> Customer;

    fn invoice(&mut self, seq: u64, roster: &[Customer]) -> Invoice;

    fn loan(&mut self, seq: u64, roster: &[Customer]) -> Loan;

    /// Number of entries for the next streaming cycle. Must be at least 1.
    fn batch_size(&mut self, max_entries: usize) -> usize;

    /// Kind of the next streamed entry.
    fn next_kind(&mut self) -> RecordKind;
}

const FIRST_NAMES: &[&str] = &[
    "Rajesh", "Priya", "Amit", "Sunita", "Vikram", "Anjali", "Deepak", "Meena", "Suresh", "Kavita",
    "Rohit", "Neha", "Arun", "Pooja", "Ravi", "Sita", "Manoj", "Rekha", "Ashok", "Lata", "Gaurav",
    "Swati", "Sanjay", "Anita", "Nitin",
];
const LAST_NAMES: &[&str] = &[
    "Sharma", "Patel", "Verma", "Gupta", "Singh", "Jain", "Agarwal", "Mehta", "Shah", "Chopra",
    "Kumar", "Desai", "Modi", "Trivedi", "Reddy", "Nair", "Iyer", "Pillai", "Das", "Bose",
];
const CITIES: &[&str] = &[
    "Mumbai", "Delhi", "Ahmedabad", "Jaipur", "Bangalore", "Chennai", "Kolkata", "Hyderabad",
    "Pune", "Lucknow", "Surat", "Nagpur", "Indore", "Varanasi", "Chandigarh",
];
const AREAS: &[&str] = &[
    "Bandra West", "Karol Bagh", "Navrangpura", "Johari Bazaar", "Commercial St", "T Nagar",
    "New Market", "Charminar", "MG Road", "Hazratganj", "Ring Road", "Sadar", "Rajwada",
    "Godowlia", "Sector 17",
];
const GOLD_ITEMS: &[&str] = &[
    "Gold Necklace 22K", "Gold Bangle 22K", "Gold Ring 22K", "Gold Chain 22K", "Gold Earrings 22K",
    "Gold Pendant 18K", "Gold Bracelet 22K", "Gold Anklet 22K", "Gold Nose Pin 22K",
    "Gold Mangalsutra 22K",
];
const SILVER_ITEMS: &[&str] = &[
    "Silver Payal", "Silver Glass Set", "Silver Thali", "Silver Idol", "Silver Coin 999",
    "Silver Bangle", "Silver Ring", "Silver Chain",
];
const LOAN_ITEMS: &[&str] = &[
    "Gold Chain (Man)", "Gold Necklace Set", "Gold Bangles (4 pcs)", "Gold Ring", "Gold Earrings",
    "Gold Bracelet",
];
const GOLD_PURITIES: &[&str] = &["24K", "22K", "18K"];
const LOAN_STATUSES: &[&str] = &["ACTIVE", "ACTIVE", "ACTIVE", "CLOSED", "OVERDUE"];
const ALPHANUMERIC: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const GST_HALF_RATE: Fixed2 = Fixed2::from_hundredths(150);

/// Plausible jewellery-shop data from a `StdRng`.
///
/// A fixed seed makes the generated dataset reproducible.
#[derive(Debug)]
pub struct SyntheticFactory {
    rng: StdRng,
}

impl SyntheticFactory {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    fn pick(&mut self, options: &[&'static str]) -> &'static str {
        options.choose(&mut self.rng).copied().unwrap_or_default()
    }

    fn alphanumeric(&mut self, len: usize) -> String {
        (0..len)
            .map(|_| char::from(ALPHANUMERIC[self.rng.gen_range(0..ALPHANUMERIC.len())]))
            .collect()
    }

    /// A `YYYY-MM-DD` date between Jan 1 of `start_year` and Dec 31 of `end_year`.
    fn date_between(&mut self, start_year: i32, end_year: i32) -> String {
        let (Some(start), Some(end)) = (
            NaiveDate::from_ymd_opt(start_year, 1, 1),
            NaiveDate::from_ymd_opt(end_year, 12, 31),
        ) else {
            return String::new();
        };
        let span = (end - start).num_days().max(1) as u64;
        let offset = self.rng.gen_range(0..span);
        start
            .checked_add_days(Days::new(offset))
            .unwrap_or(start)
            .format("%Y-%m-%d")
            .to_string()
    }
}

impl RecordFactory for SyntheticFactory {
    fn customer(&mut self, seq: u64) -> Customer {
        let name = format!("{} {}", self.pick(FIRST_NAMES), self.pick(LAST_NAMES));
        let address = format!("{}, {}", self.pick(AREAS), self.pick(CITIES));
        let purchases: u32 = self.rng.gen_range(10_000..5_000_000);
        let gstin = if self.rng.gen_ratio(1, 4) {
            let state: u32 = self.rng.gen_range(10..36);
            Some(format!("{}{}", state, self.alphanumeric(10)))
        } else {
            None
        };

        Customer {
            id: customer_key(seq),
            name,
            phone: format!("9{}", self.rng.gen_range(100_000_000..999_999_999u32)),
            address,
            gstin,
            total_purchases: Fixed2::from_units(i64::from(purchases)),
            active_loans: self.rng.gen_range(0..4),
            loyalty_points: purchases / 1000,
            join_date: self.date_between(2020, 2025),
        }
    }

    fn invoice(&mut self, seq: u64, roster: &[Customer]) -> Invoice {
        let customer_id = roster
            .choose(&mut self.rng)
            .map(|c| c.id.clone())
            .unwrap_or_default();
        let is_gold = self.rng.gen_range(0..3) > 0;

        let (item, purity, rate) = if is_gold {
            (
                self.pick(GOLD_ITEMS),
                self.pick(GOLD_PURITIES),
                self.rng.gen_range(6_500..7_800),
            )
        } else {
            (self.pick(SILVER_ITEMS), "999", self.rng.gen_range(75..110))
        };

        let weight = Fixed2::from_hundredths(self.rng.gen_range(100..5_100));
        let rate_per_gram = Fixed2::from_units(rate);
        let making_charges = Fixed2::from_units(self.rng.gen_range(100..500));
        let gross = weight.times(rate_per_gram) + making_charges;
        let discount = Fixed2::from_units(self.rng.gen_range(0..3_000)).min(gross);

        let sub_total = gross - discount;
        let cgst = sub_total.percent(GST_HALF_RATE);
        let sgst = cgst;
        let gst_amount = cgst + sgst;

        Invoice {
            id: invoice_key(seq),
            customer_id,
            date: self.date_between(2024, 2025),
            bill_type: Some(if self.rng.gen_bool(0.5) { "PAKKA" } else { "KACHA" }.to_string()),
            item_description: item.to_string(),
            metal: if is_gold { "GOLD" } else { "SILVER" }.to_string(),
            weight,
            purity: purity.to_string(),
            rate_per_gram,
            making_charges,
            discount,
            sub_total,
            cgst_rate: GST_HALF_RATE,
            sgst_rate: GST_HALF_RATE,
            igst_rate: Fixed2::ZERO,
            gst_amount,
            total_amount: sub_total + gst_amount,
            status: if self.rng.gen_ratio(1, 5) { "PENDING" } else { "PAID" }.to_string(),
        }
    }

    fn loan(&mut self, seq: u64, roster: &[Customer]) -> Loan {
        let (customer_name, customer_phone) = roster
            .choose(&mut self.rng)
            .map(|c| (c.name.clone(), c.phone.clone()))
            .unwrap_or_default();
        let principal: i64 = self.rng.gen_range(10_000..500_000);

        Loan {
            id: loan_key(seq),
            customer_name,
            customer_phone,
            gov_id: self.alphanumeric(10),
            metal_type: "GOLD".to_string(),
            product_description: self.pick(LOAN_ITEMS).to_string(),
            weight: Fixed2::from_hundredths(self.rng.gen_range(200..3_200)),
            purity: "22K".to_string(),
            principal_amount: Fixed2::from_units(principal),
            interest_rate: Fixed2::from_hundredths(self.rng.gen_range(50..250)),
            start_date: self.date_between(2023, 2025),
            due_date: self.date_between(2025, 2026),
            total_repaid: Fixed2::from_units(self.rng.gen_range(0..principal / 2)),
            status: self.pick(LOAN_STATUSES).to_string(),
        }
    }

    fn batch_size(&mut self, max_entries: usize) -> usize {
        let ceiling = max_entries.clamp(1, STREAM_BATCH_CEILING);
        self.rng.gen_range(1..=ceiling)
    }

    fn next_kind(&mut self) -> RecordKind {
        RecordKind::ALL[self.rng.gen_range(0..RecordKind::ALL.len())]
    }
}
