//! Collection routing: classifier output + filename patterns pick one of
//! a closed set of target collections. Pricing files are force-routed and
//! take precedence over everything else.

use zantara_models::DocumentType;

const PRICING_FILENAME_MARKERS: &[&str] = &["pricing", "price_list", "harga", "tarif", "biaya"];
const TAX_FILENAME_MARKERS: &[&str] = &["tax", "pajak", "ppn", "pph"];
const VISA_FILENAME_MARKERS: &[&str] = &["visa", "kitas", "kitap", "imigrasi", "keimigrasian"];
const PROPERTY_FILENAME_MARKERS: &[&str] = &["property", "properti", "tanah", "hak_milik"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingDecision {
    pub collection_name: &'static str,
    pub is_pricing: bool,
}

fn filename_matches(filename: &str, markers: &[&str]) -> bool {
    let lower = filename.to_lowercase();
    markers.iter().any(|m| lower.contains(m))
}

/// Route a file to one of `{tax, visa, legal-unified, kbli, property,
/// litigation, generic}`. Pricing takes precedence over everything else.
pub fn route_collection(doc_type: DocumentType, filename: &str) -> RoutingDecision {
    if filename_matches(filename, PRICING_FILENAME_MARKERS) || doc_type == DocumentType::Pricing {
        return RoutingDecision { collection_name: "pricing", is_pricing: true };
    }

    let collection_name = match doc_type {
        DocumentType::KbliCode => "kbli",
        DocumentType::CourtRuling => "litigation",
        _ if filename_matches(filename, TAX_FILENAME_MARKERS) => "tax",
        _ if filename_matches(filename, VISA_FILENAME_MARKERS) => "visa",
        _ if filename_matches(filename, PROPERTY_FILENAME_MARKERS) => "property",
        DocumentType::Statute | DocumentType::Regulation | DocumentType::MinisterialDecree => "legal-unified",
        DocumentType::Generic => "generic",
        DocumentType::Pricing => unreachable!("handled above"),
    };

    RoutingDecision { collection_name, is_pricing: false }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pricing_filename_forces_pricing_collection_regardless_of_type() {
        let decision = route_collection(DocumentType::Generic, "bali_zero_official_prices_2025.json");
        assert_eq!(decision.collection_name, "pricing");
        assert!(decision.is_pricing);
    }

    #[test]
    fn visa_keyword_routes_to_visa_collection() {
        let decision = route_collection(DocumentType::Statute, "uu_keimigrasian_2023.pdf");
        assert_eq!(decision.collection_name, "visa");
        assert!(!decision.is_pricing);
    }

    #[test]
    fn kbli_doc_type_routes_to_kbli_collection() {
        let decision = route_collection(DocumentType::KbliCode, "kbli_2020.pdf");
        assert_eq!(decision.collection_name, "kbli");
    }

    #[test]
    fn generic_fallback() {
        let decision = route_collection(DocumentType::Generic, "random_notes.txt");
        assert_eq!(decision.collection_name, "generic");
    }
}
