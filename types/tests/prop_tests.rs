use proptest::prelude::*;

use vigil_types::{Address, NodeId, ShortId};

proptest! {
    /// The short id is always the first eight bytes of the packed identifier.
    #[test]
    fn short_id_is_node_id_prefix(x in prop::array::uniform32(0u8..), y in prop::array::uniform32(0u8..)) {
        let id = NodeId::from_halves(x, y);
        prop_assert_eq!(&id.short_id().0[..], &x[..8]);
    }

    /// Short ids print as 16 lowercase hex characters and parse back.
    #[test]
    fn short_id_text_form(bytes in prop::array::uniform8(0u8..)) {
        let id = ShortId(bytes);
        let text = id.to_hex();
        prop_assert_eq!(text.len(), 16);
        prop_assert_eq!(text.to_lowercase(), text.clone());
        prop_assert_eq!(text.parse::<ShortId>().unwrap(), id);
    }

    /// Only the all-zero short id is the end-of-list sentinel.
    #[test]
    fn short_id_zero_iff_all_zero(bytes in prop::array::uniform8(0u8..)) {
        prop_assert_eq!(ShortId(bytes).is_zero(), bytes == [0u8; 8]);
    }

    /// Addresses display with a 0x prefix that parsing accepts.
    #[test]
    fn address_display_parses(bytes in prop::array::uniform20(0u8..)) {
        let addr = Address::new(bytes);
        prop_assert_eq!(addr.to_string().parse::<Address>().unwrap(), addr);
    }
}
