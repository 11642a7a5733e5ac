// self
use crate::{ledger::Category, remote::RemoteTransaction};

// Scanned in order; the first group with a hit wins.
const CATEGORY_KEYWORDS: &[(&[&str], Category)] = &[
	(&["salary", "payroll", "wages"], Category::Income),
	(&["grocery", "supermarket", "food market"], Category::FoodAndDining),
	(&["gas", "fuel", "petrol"], Category::Transportation),
	(&["restaurant", "cafe", "coffee", "diner"], Category::FoodAndDining),
	(&["pharmacy", "medical", "doctor", "dental"], Category::Healthcare),
	(
		&["electric", "water bill", "internet", "utility", "phone bill"],
		Category::BillsAndUtilities,
	),
	(&["amazon", "shopping", "store", "retail"], Category::Shopping),
];

/// Extracts a merchant name from a remote transaction.
///
/// Priority: counterparty name, counterparty holder name, free-text narrative, raw
/// description. Blank candidates are skipped; `None` when nothing usable remains.
pub fn merchant_name(remote: &RemoteTransaction) -> Option<String> {
	let counterparty = remote.counterparty.as_ref();

	[
		counterparty.and_then(|counterparty| counterparty.name.as_deref()),
		counterparty.and_then(|counterparty| counterparty.holder_name.as_deref()),
		remote.details.narrative.as_deref(),
		remote.details.description.as_deref(),
	]
	.into_iter()
	.flatten()
	.map(str::trim)
	.find(|candidate| !candidate.is_empty())
	.map(str::to_owned)
}

/// Assigns a spending category with a case-insensitive keyword scan over the text.
pub fn categorize(text: &str) -> Category {
	let haystack = text.to_lowercase();

	for (keywords, category) in CATEGORY_KEYWORDS {
		if keywords.iter().any(|keyword| haystack.contains(keyword)) {
			return *category;
		}
	}

	Category::Other
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn remote(payload: &str) -> RemoteTransaction {
		serde_json::from_str(payload).expect("Remote transaction fixture should deserialize.")
	}

	#[test]
	fn merchant_extraction_follows_the_priority_order() {
		let full = remote(
			r#"{
				"id": "tx1",
				"details": {"description": "CARD PURCHASE 1234", "narrative": "POS 99887"},
				"counterparty": {"name": "Blue Bottle Coffee", "holder_name": "BB Holdings"}
			}"#,
		);

		assert_eq!(merchant_name(&full).as_deref(), Some("Blue Bottle Coffee"));

		let holder_only = remote(
			r#"{
				"id": "tx2",
				"details": {"description": "CARD PURCHASE"},
				"counterparty": {"name": "  ", "holder_name": "BB Holdings"}
			}"#,
		);

		assert_eq!(merchant_name(&holder_only).as_deref(), Some("BB Holdings"));

		let narrative_only = remote(
			r#"{"id": "tx3", "details": {"description": "CARD", "narrative": "Shell 44"}}"#,
		);

		assert_eq!(merchant_name(&narrative_only).as_deref(), Some("Shell 44"));

		let bare = remote(r#"{"id": "tx4", "details": {}}"#);

		assert_eq!(merchant_name(&bare), None);
	}

	#[test]
	fn categories_match_spending_keywords_case_insensitively() {
		assert_eq!(categorize("ACME Payroll Deposit"), Category::Income);
		assert_eq!(categorize("WholeFoods Supermarket"), Category::FoodAndDining);
		assert_eq!(categorize("Shell Gas Station"), Category::Transportation);
		assert_eq!(categorize("Corner Cafe"), Category::FoodAndDining);
		assert_eq!(categorize("City Pharmacy"), Category::Healthcare);
		assert_eq!(categorize("Electric Company"), Category::BillsAndUtilities);
		assert_eq!(categorize("AMAZON MARKETPLACE"), Category::Shopping);
		assert_eq!(categorize("Wire transfer 8812"), Category::Other);
		assert_eq!(categorize(""), Category::Other);
	}

	#[test]
	fn earlier_keyword_groups_win_ties() {
		// "grocery" outranks the generic "store" keyword.
		assert_eq!(categorize("Grocery Store"), Category::FoodAndDining);
	}
}
