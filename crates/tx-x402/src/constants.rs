//! Reserved identifiers that, once chosen, must stay stable (spec §9 Open Questions).

/// Transaction-type byte identifying an x402 typed transaction. Distinct from the standard
/// legacy (conventionally untyped), EIP-2930 (`0x01`), and EIP-1559 (`0x02`) types named in
/// spec §6.2; chosen from the high end of the EIP-2718 type-byte space (`< 0x80`) to avoid
/// colliding with any future standard type. See DESIGN.md for why `0x7e`.
pub const X402_TX_TYPE: u8 = 0x7e;

/// Reserved 20-byte identifier the anti-replay registry is persisted under (spec §6.6),
/// shared with `splendor-x402-engine`.
pub use splendor_x402_engine::ANTI_REPLAY_SYSTEM_ADDRESS;
