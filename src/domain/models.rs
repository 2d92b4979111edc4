//! Customer, invoice and loan rows.

use super::fixed::Fixed2;
use crate::store::Record;

pub fn customer_key(seq: u64) -> String {
    format!("C{:05}", seq)
}

pub fn invoice_key(seq: u64) -> String {
    format!("INV-{:06}", seq)
}

pub fn loan_key(seq: u64) -> String {
    format!("L-{:05}", seq)
}

fn optional(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

/// A shop customer with purchase history and loyalty tracking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub address: String,
    pub gstin: Option<String>,
    pub total_purchases: Fixed2,
    pub active_loans: u32,
    pub loyalty_points: u32,
    pub join_date: String,
}

impl Record for Customer {
    const FIELDS: &'static [&'static str] = &[
        "Id",
        "Name",
        "Phone",
        "Address",
        "Gstin",
        "TotalPurchases",
        "ActiveLoans",
        "LoyaltyPoints",
        "JoinDate",
    ];

    fn values(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.name.clone(),
            self.phone.clone(),
            self.address.clone(),
            optional(&self.gstin),
            self.total_purchases.to_string(),
            self.active_loans.to_string(),
            self.loyalty_points.to_string(),
            self.join_date.clone(),
        ]
    }
}

/// A single-item invoice with its GST breakdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invoice {
    pub id: String,
    pub customer_id: String,
    pub date: String,
    /// `PAKKA` or `KACHA`.
    pub bill_type: Option<String>,
    pub item_description: String,
    pub metal: String,
    pub weight: Fixed2,
    pub purity: String,
    pub rate_per_gram: Fixed2,
    pub making_charges: Fixed2,
    pub discount: Fixed2,
    pub sub_total: Fixed2,
    pub cgst_rate: Fixed2,
    pub sgst_rate: Fixed2,
    pub igst_rate: Fixed2,
    pub gst_amount: Fixed2,
    pub total_amount: Fixed2,
    /// `PAID` or `PENDING`.
    pub status: String,
}

impl Record for Invoice {
    const FIELDS: &'static [&'static str] = &[
        "Id",
        "CustomerId",
        "Date",
        "BillType",
        "ItemDescription",
        "Metal",
        "Weight",
        "Purity",
        "RatePerGram",
        "MakingCharges",
        "Discount",
        "SubTotal",
        "CgstRate",
        "SgstRate",
        "IgstRate",
        "GstAmount",
        "TotalAmount",
        "Status",
    ];

    fn values(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.customer_id.clone(),
            self.date.clone(),
            optional(&self.bill_type),
            self.item_description.clone(),
            self.metal.clone(),
            self.weight.to_string(),
            self.purity.clone(),
            self.rate_per_gram.to_string(),
            self.making_charges.to_string(),
            self.discount.to_string(),
            self.sub_total.to_string(),
            self.cgst_rate.to_string(),
            self.sgst_rate.to_string(),
            self.igst_rate.to_string(),
            self.gst_amount.to_string(),
            self.total_amount.to_string(),
            self.status.clone(),
        ]
    }
}

/// A loan against pledged jewellery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loan {
    pub id: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub gov_id: String,
    pub metal_type: String,
    pub product_description: String,
    pub weight: Fixed2,
    pub purity: String,
    pub principal_amount: Fixed2,
    pub interest_rate: Fixed2,
    pub start_date: String,
    pub due_date: String,
    pub total_repaid: Fixed2,
    /// `ACTIVE`, `CLOSED` or `OVERDUE`.
    pub status: String,
}

impl Record for Loan {
    const FIELDS: &'static [&'static str] = &[
        "Id",
        "CustomerName",
        "CustomerPhone",
        "GovId",
        "MetalType",
        "ProductDescription",
        "Weight",
        "Purity",
        "PrincipalAmount",
        "InterestRate",
        "StartDate",
        "DueDate",
        "TotalRepaid",
        "Status",
    ];

    fn values(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.customer_name.clone(),
            self.customer_phone.clone(),
            self.gov_id.clone(),
            self.metal_type.clone(),
            self.product_description.clone(),
            self.weight.to_string(),
            self.purity.clone(),
            self.principal_amount.to_string(),
            self.interest_rate.to_string(),
            self.start_date.clone(),
            self.due_date.clone(),
            self.total_repaid.to_string(),
            self.status.clone(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{parse_csv, record_line};

    fn customer() -> Customer {
        Customer {
            id: customer_key(1),
            name: "Priya Mehta".into(),
            phone: "9123456789".into(),
            address: "Bandra West, Mumbai".into(),
            gstin: None,
            total_purchases: Fixed2::from_units(125_000),
            active_loans: 1,
            loyalty_points: 125,
            join_date: "2021-04-09".into(),
        }
    }

    #[test]
    fn test_business_keys() {
        assert_eq!(customer_key(1), "C00001");
        assert_eq!(invoice_key(42), "INV-000042");
        assert_eq!(loan_key(12_345), "L-12345");
    }

    #[test]
    fn test_values_match_field_count() {
        let c = customer();
        assert_eq!(c.values().len(), Customer::FIELDS.len());
        assert_eq!(Customer::FIELDS[0], "Id");
    }

    #[test]
    fn test_missing_gstin_renders_empty() {
        let values = customer().values();
        assert_eq!(values[4], "");
        assert_eq!(values[5], "125000.00");
    }

    #[test]
    fn test_address_with_comma_survives_csv() {
        let rows = parse_csv(&record_line(&customer())).unwrap();
        assert_eq!(rows[0][3], "Bandra West, Mumbai");
        assert_eq!(rows[0].len(), Customer::FIELDS.len());
    }
}
