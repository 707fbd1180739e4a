//! Precision-tagged 64-bit geohash encoding and decoding.
//!
//! Latitude and longitude are packed into the low bits of a `u64` by
//! Morton-style bit interleaving (longitude on the even payload bits,
//! latitude on the odd ones). The top of the word stores a precision tag so
//! a geohash can be manipulated without carrying its bit length separately:
//! bit 62 marks the value as tagged and a single set bit above the payload
//! encodes the length.
//!
//! Precision runs from 0 to 61 bits. Because the payload interleaves a
//! 31-bit longitude fraction with a 30-bit latitude fraction, longitude
//! keeps one extra bit of resolution whenever the precision is odd.
//!
//! Preconditions for [`encode`] (results are undefined if not met):
//!
//! 1. `lat` in `[-90, 90)`
//! 2. `lng` in `[-180, 180)`
//! 3. `bits` in `[0, 61]`
//!
//! # Examples
//!
//! ```
//! use geodex::geohash;
//!
//! let gh = geohash::encode(38.0, -117.0, 60);
//! assert_eq!(geohash::precision(gh), 60);
//!
//! let d = geohash::decode_tagged(gh);
//! assert!(d.min_lat() <= 38.0 && 38.0 < d.max_lat());
//! assert!(d.min_lng() <= -117.0 && -117.0 < d.max_lng());
//!
//! // Neighbour arithmetic: one cell to the east.
//! let east = geohash::east_tagged(gh);
//! assert!(geohash::decode_tagged(east).lng > d.lng);
//! ```

/// The base-32 alphabet (omits `a`, `i`, `l`, `o`).
pub const BASE32: [u8; 32] = *b"0123456789bcdefghjkmnpqrstuvwxyz";

const TAG_BIT: u64 = 0x4000_0000_0000_0000;

// Inverse alphabet lookup by ASCII offset; an array beats a map on this hot
// path and avoids any hashing.
const BASE32_INV: [u8; 128] = {
    let mut table = [0u8; 128];
    let mut i = 0;
    while i < BASE32.len() {
        table[BASE32[i] as usize] = i as u8;
        i += 1;
    }
    table
};

/// Information about a decoded geohash: the cell centre and the error bars
/// (half cell extents) in each dimension.
#[derive(Debug, Clone, Copy)]
pub struct Decoded {
    /// The geohash this decoding came from.
    pub bits: u64,
    /// Payload length in bits.
    pub precision: u32,
    /// Cell centre latitude.
    pub lat: f64,
    /// Cell centre longitude.
    pub lng: f64,
    /// Half the cell height.
    pub lat_error: f64,
    /// Half the cell width.
    pub lng_error: f64,
}

impl Decoded {
    /// Lower latitude bound, inclusive.
    pub fn min_lat(&self) -> f64 {
        self.lat - self.lat_error
    }

    /// Upper latitude bound, exclusive.
    pub fn max_lat(&self) -> f64 {
        self.lat + self.lat_error
    }

    /// Lower longitude bound, inclusive.
    pub fn min_lng(&self) -> f64 {
        self.lng - self.lng_error
    }

    /// Upper longitude bound, exclusive.
    pub fn max_lng(&self) -> f64 {
        self.lng + self.lng_error
    }
}

impl PartialEq for Decoded {
    fn eq(&self, other: &Self) -> bool {
        self.bits == other.bits && self.precision == other.precision
    }
}

impl Eq for Decoded {}

/// Returns the precision in bits of a tagged geohash.
///
/// The precision is recovered by binary-searching for the highest set bit
/// below the tag marker.
///
/// # Panics
///
/// Panics if the value is untagged; precision is only defined for tagged
/// geohashes.
pub fn precision(g: u64) -> u32 {
    assert!(
        is_tagged(g),
        "cannot calculate precision of an untagged geohash {g:#x}"
    );
    let g = g & 0x3fff_ffff_ffff_ffff;
    let mut bits = 0u32;
    let mut b = 32u32;
    while b != 0 {
        if g & !(u64::MAX << (bits | b)) != g {
            bits |= b;
        }
        b >>= 1;
    }
    bits
}

/// Returns true if a geohash carries precision information.
pub fn is_tagged(gh: u64) -> bool {
    gh & TAG_BIT != 0
}

/// Removes the precision tag from a geohash. Untagged values pass through
/// unchanged, so `untag(untag(g)) == untag(g)`.
pub fn untag(gh: u64) -> u64 {
    if is_tagged(gh) {
        gh & !precision_tag(precision(gh))
    } else {
        gh
    }
}

/// Returns the value OR-ed into a payload to store its precision: bit 62
/// marks the value as tagged (kept clear of the sign position so untagged
/// decoders still see a positive number), and `1 << bits` records the
/// length.
pub fn precision_tag(bits: u32) -> u64 {
    TAG_BIT | 1 << bits
}

/// Encodes a lat/lng into a tagged geohash with `bits` bits of precision.
///
/// Preconditions (unchecked, results undefined otherwise):
/// `lat` in `[-90, 90)`, `lng` in `[-180, 180)`, `bits` in `[0, 61]`.
pub fn encode(lat: f64, lng: f64, bits: u32) -> u64 {
    let lats = widen(((lat + 90.0) * 0x8000_0000u64 as f64 / 180.0) as u64 & 0x7fff_ffff);
    let lngs = widen(((lng + 180.0) * 0x8000_0000u64 as f64 / 360.0) as u64 & 0x7fff_ffff);
    (lats >> 1 | lngs) >> (61 - bits) | precision_tag(bits)
}

/// Decodes a geohash of known precision into its cell centre and error
/// bars. Any tag bits present are shifted or masked away, so both tagged
/// and raw payloads decode correctly.
pub fn decode(gh: u64, bits: u32) -> Decoded {
    let shifted = gh << (61 - bits);
    let lat = (unwiden(shifted >> 1) & 0x3fff_ffff) as f64 / 0x4000_0000u64 as f64 * 180.0 - 90.0;
    let lng = (unwiden(shifted) & 0x7fff_ffff) as f64 / 0x8000_0000u64 as f64 * 360.0 - 180.0;

    // Repeated squaring to get the half-cell error, much faster than a loop
    // over the bit count.
    let mut error: f64 = 1.0;
    if bits & 32 != 0 {
        error *= 0.25;
    }
    if bits & 16 != 0 {
        error *= 0.5;
    }
    error *= error;
    if bits & 8 != 0 {
        error *= 0.5;
    }
    error *= error;
    if bits & 4 != 0 {
        error *= 0.5;
    }
    error *= error;
    if bits & 2 != 0 {
        error *= 0.5;
    }

    // bits & 1 applies only to longitude and is folded in below.
    let lat_error = error * 90.0;
    let lng_error = error * if bits & 1 != 0 { 90.0 } else { 180.0 };
    Decoded {
        bits: gh,
        precision: bits,
        lat: lat + lat_error,
        lng: lng + lng_error,
        lat_error,
        lng_error,
    }
}

/// Decodes a tagged geohash.
pub fn decode_tagged(gh: u64) -> Decoded {
    decode(gh, precision(gh))
}

/// Returns the geohash shifted by `(dx, dy)` cells; `(1, 0)` is the cell
/// immediately east.
///
/// The two interleaved lanes are unwoven, stepped, and rewoven. Which lane
/// holds longitude depends on the parity of the precision: the lowest
/// payload bit belongs to longitude exactly when `bits` is odd, so the
/// deltas swap lanes when `bits` is even.
pub fn shift(gh: u64, bits: u32, dx: i64, dy: i64) -> u64 {
    let swap = bits & 1 == 0;
    let sx = if swap { dy } else { dx };
    let sy = if swap { dx } else { dy };
    (widen(unwiden(gh >> 1).wrapping_add(sy as u64)) << 1
        | widen(unwiden(gh).wrapping_add(sx as u64)))
        & !(u64::MAX << bits)
        | precision_tag(bits)
}

/// Shifts a tagged geohash by `(dx, dy)` cells.
pub fn shift_tagged(gh: u64, dx: i64, dy: i64) -> u64 {
    shift(gh, precision(gh), dx, dy)
}

/// The cell immediately north.
pub fn north(gh: u64, bits: u32) -> u64 {
    shift(gh, bits, 0, 1)
}

/// The cell immediately east.
pub fn east(gh: u64, bits: u32) -> u64 {
    shift(gh, bits, 1, 0)
}

/// The cell immediately south.
pub fn south(gh: u64, bits: u32) -> u64 {
    shift(gh, bits, 0, -1)
}

/// The cell immediately west.
pub fn west(gh: u64, bits: u32) -> u64 {
    shift(gh, bits, -1, 0)
}

/// The cell immediately north of a tagged geohash.
pub fn north_tagged(gh: u64) -> u64 {
    north(gh, precision(gh))
}

/// The cell immediately east of a tagged geohash.
pub fn east_tagged(gh: u64) -> u64 {
    east(gh, precision(gh))
}

/// The cell immediately south of a tagged geohash.
pub fn south_tagged(gh: u64) -> u64 {
    south(gh, precision(gh))
}

/// The cell immediately west of a tagged geohash.
pub fn west_tagged(gh: u64) -> u64 {
    west(gh, precision(gh))
}

/// Takes two geohashes of the same precision and returns the minimal
/// precision reduction required for a single cell to contain both.
///
/// Works only when both or neither input is tagged; mixing a tagged and an
/// untagged value gives incorrect results.
pub fn union_precision_reduction(gh1: u64, gh2: u64) -> u32 {
    let d = gh1 ^ gh2;
    if d == 0 {
        return 0;
    }
    let mut bits = 0u32;
    let mut b = 32u32;
    while b != 0 {
        if d & !(u64::MAX << (bits | b)) != d {
            bits |= b;
        }
        b >>= 1;
    }
    bits + 1
}

/// Renders a geohash as base-32. The precision must be a multiple of 5 for
/// the result to be meaningful.
pub fn to_base32(gh: u64, bits: u32) -> String {
    let n = (bits / 5) as usize;
    let mut gh = gh;
    let mut chars = vec!['0'; n];
    for i in (0..n).rev() {
        chars[i] = BASE32[(gh & 0x1f) as usize] as char;
        gh >>= 5;
    }
    chars.into_iter().collect()
}

/// Renders a tagged geohash as base-32.
pub fn to_base32_tagged(gh: u64) -> String {
    to_base32(gh, precision(gh))
}

/// Encodes a lat/lng directly to base-32. `bits` must be a multiple of 5.
pub fn encode_base32(lat: f64, lng: f64, bits: u32) -> String {
    to_base32(encode(lat, lng, bits), bits)
}

/// Parses a base-32 string into a tagged geohash of `5 * len` bits. Every
/// character must belong to the geohash alphabet.
pub fn from_base32(base32: &str) -> u64 {
    let mut result = 0u64;
    for c in base32.bytes() {
        result <<= 5;
        result |= BASE32_INV[c as usize] as u64;
    }
    result | precision_tag(base32.len() as u32 * 5)
}

/// Parses a base-32 string and decodes it.
pub fn decode_base32(base32: &str) -> Decoded {
    decode(from_base32(base32), base32.len() as u32 * 5)
}

/// "Widens" a 32-bit value so each bit `i` moves to position `2i`, with a
/// zero to its left. First step of Morton interleaving.
///
/// <https://graphics.stanford.edu/~seander/bithacks.html#InterleaveBMN>
pub fn widen(mut low32: u64) -> u64 {
    low32 |= low32 << 16;
    low32 &= 0x0000_ffff_0000_ffff;
    low32 |= low32 << 8;
    low32 &= 0x00ff_00ff_00ff_00ff;
    low32 |= low32 << 4;
    low32 &= 0x0f0f_0f0f_0f0f_0f0f;
    low32 |= low32 << 2;
    low32 &= 0x3333_3333_3333_3333;
    low32 |= low32 << 1;
    low32 &= 0x5555_5555_5555_5555;
    low32
}

/// Inverse of [`widen`]; does not assume the odd bits are zero.
///
/// <http://fgiesen.wordpress.com/2009/12/13/decoding-morton-codes/>
pub fn unwiden(mut wide: u64) -> u64 {
    wide &= 0x5555_5555_5555_5555;
    wide ^= wide >> 1;
    wide &= 0x3333_3333_3333_3333;
    wide ^= wide >> 2;
    wide &= 0x0f0f_0f0f_0f0f_0f0f;
    wide ^= wide >> 4;
    wide &= 0x00ff_00ff_00ff_00ff;
    wide ^= wide >> 8;
    wide &= 0x0000_ffff_0000_ffff;
    wide ^= wide >> 16;
    wide &= 0x0000_0000_ffff_ffff;
    wide
}
