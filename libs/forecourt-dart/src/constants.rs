//! DART protocol constants (MKR-5 pump controllers)

/// Start marker; the address and control bytes precede it on the wire.
pub const STX: u8 = 0x02;

/// End marker, directly before the stop byte.
pub const ETX: u8 = 0x03;

/// Stop byte terminating every frame.
pub const SF: u8 = 0xFA;

/// Fixed control bits for host-originated data frames.
pub const CTRL_HOST_DATA: u8 = 0xF0;

/// Sequence toggle bit inside the control byte.
pub const CTRL_SEQ_BIT: u8 = 0x01;

/// Link bytes ahead of the start marker: address and control.
pub const LINK_PREFIX: usize = 2;

/// Offset of the start marker within a frame.
pub const STX_OFFSET: usize = 2;

/// Envelope bytes around the body:
/// `[ADDR][CTRL][STX][LNG] body [CRC-L][CRC-H][ETX][SF]`.
pub const FRAME_OVERHEAD: usize = 8;

/// Largest body the one-byte length field can declare.
pub const MAX_BODY_LEN: usize = 255;

// ----------------------------------------------------------------------------
// Transaction codes (host to pump: CD*, pump to host: DC*)
// ----------------------------------------------------------------------------

/// CD1 command to the pump; payload is one command sub-code.
pub const TRANS_COMMAND: u8 = 0x01;
/// CD2 allowed-nozzles restriction.
pub const TRANS_ALLOW_NOZZLES: u8 = 0x02;
/// CD3 preset volume, 4-byte BCD payload.
pub const TRANS_PRESET_VOLUME: u8 = 0x03;
/// CD4 preset amount, 4-byte BCD payload.
pub const TRANS_PRESET_AMOUNT: u8 = 0x04;
/// CD5 price table update.
pub const TRANS_PRICE_UPDATE: u8 = 0x05;
/// CD14 suspend filling on one nozzle (0 = whole pump).
pub const TRANS_SUSPEND: u8 = 0x0E;
/// CD15 resume filling on one nozzle (0 = whole pump).
pub const TRANS_RESUME: u8 = 0x0F;

/// DC1 pump status report.
pub const TRANS_STATUS: u8 = 0x01;
/// DC2 dispensed volume and amount, two 4-byte BCD quantities.
pub const TRANS_VOLUME_AMOUNT: u8 = 0x02;
/// DC3 nozzle status, optionally preceded by the 3-byte BCD filling price.
pub const TRANS_NOZZLE_PRICE: u8 = 0x03;
/// DC5 alarm report.
pub const TRANS_ALARM: u8 = 0x05;

/// Bit set in the DC3 status byte while the nozzle is out of its holster.
pub const NOZZLE_OUT_BIT: u8 = 0x10;
/// Low-nibble mask selecting the nozzle number in the DC3 status byte.
pub const NOZZLE_NUM_MASK: u8 = 0x0F;

/// Preset fields (CD3/CD4) are 4 packed-BCD bytes.
pub const PRESET_BCD_WIDTH: usize = 4;
/// Price table entries (CD5) and the DC3 price are 3 packed-BCD bytes.
pub const PRICE_BCD_WIDTH: usize = 3;
/// DC2 carries volume and amount as two 4-byte BCD quantities.
pub const QUANTITY_BCD_WIDTH: usize = 4;
