const DNA_BITMASK_A: u8 = 1;
const DNA_BITMASK_C: u8 = 2;
const DNA_BITMASK_G: u8 = 4;
const DNA_BITMASK_T: u8 = 8;
const DNA_BITMASK_N: u8 = DNA_BITMASK_A | DNA_BITMASK_C | DNA_BITMASK_G | DNA_BITMASK_T;

/// A bitmasked IUPAC code for DNA bases, eg DNA_BITMASK_A|DNA_BITMASK_C
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct IupacCode(u8);

impl IupacCode {
    pub fn new(bitmask: u8) -> Self {
        Self(bitmask)
    }

    #[inline(always)]
    pub fn from_letter(letter: u8) -> Self {
        match letter.to_ascii_uppercase() {
            b'A' => Self(DNA_BITMASK_A),
            b'C' => Self(DNA_BITMASK_C),
            b'G' => Self(DNA_BITMASK_G),
            b'T' => Self(DNA_BITMASK_T),
            b'U' => Self(DNA_BITMASK_T),
            b'W' => Self(DNA_BITMASK_A | DNA_BITMASK_T),
            b'S' => Self(DNA_BITMASK_C | DNA_BITMASK_G),
            b'M' => Self(DNA_BITMASK_A | DNA_BITMASK_C),
            b'K' => Self(DNA_BITMASK_G | DNA_BITMASK_T),
            b'R' => Self(DNA_BITMASK_A | DNA_BITMASK_G),
            b'Y' => Self(DNA_BITMASK_C | DNA_BITMASK_T),
            b'B' => Self(DNA_BITMASK_C | DNA_BITMASK_G | DNA_BITMASK_T),
            b'D' => Self(DNA_BITMASK_A | DNA_BITMASK_G | DNA_BITMASK_T),
            b'H' => Self(DNA_BITMASK_A | DNA_BITMASK_C | DNA_BITMASK_T),
            b'V' => Self(DNA_BITMASK_A | DNA_BITMASK_C | DNA_BITMASK_G),
            b'N' => Self(DNA_BITMASK_N),
            _ => Self(0),
        }
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    #[inline(always)]
    pub fn subset(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    /// True if `base` is one of the bases this code stands for.
    /// Only plain A/C/G/T bases can match.
    #[inline(always)]
    pub fn matches_base(self, base: u8) -> bool {
        Self::is_unambiguous_base(base) && !self.subset(Self::from_letter(base)).is_empty()
    }

    #[inline(always)]
    pub fn is_valid_letter(letter: u8) -> bool {
        matches!(
            letter.to_ascii_uppercase(),
            b'A' | b'C'
                | b'G'
                | b'T'
                | b'U'
                | b'W'
                | b'S'
                | b'M'
                | b'K'
                | b'R'
                | b'Y'
                | b'B'
                | b'D'
                | b'H'
                | b'V'
                | b'N'
        )
    }

    /// A, C, G or T (uppercase only; sequences are normalized on import)
    #[inline(always)]
    pub fn is_unambiguous_base(letter: u8) -> bool {
        matches!(letter, b'A' | b'C' | b'G' | b'T')
    }

    #[inline(always)]
    pub fn to_vec(&self) -> Vec<u8> {
        let mut ret = Vec::with_capacity(4);
        if self.0 & DNA_BITMASK_A != 0 {
            ret.push(b'A');
        }
        if self.0 & DNA_BITMASK_C != 0 {
            ret.push(b'C');
        }
        if self.0 & DNA_BITMASK_G != 0 {
            ret.push(b'G');
        }
        if self.0 & DNA_BITMASK_T != 0 {
            ret.push(b'T');
        }
        ret
    }
}
