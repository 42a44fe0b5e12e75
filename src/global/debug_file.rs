
use parking_lot::Mutex;

/// Hands out the numbered names of debug checkpoint files.
#[derive(Debug, Default)]
pub struct DebugFileNamer {
    number: Mutex<u64>,
}

impl DebugFileNamer {
    pub fn new() -> DebugFileNamer {
        DebugFileNamer {
            number: Mutex::new(0),
        }
    }

    /// Advance the counter, or force it to `new_number` when that is non-zero, and
    /// format `{dir}/{prefix}_{NNN}_{comment}`.
    pub fn next(&self, dir: &str, prefix: &str, comment: &str, new_number: u32) -> String {
        let number = {
            let mut number = self.number.lock();
            *number = if new_number != 0 { u64::from(new_number) } else { *number + 1 };
            *number
        };

        format!("{}/{}_{:03}_{}", dir, prefix, number, comment)
    }

    /// Last number handed out, 0 if none yet.
    pub fn current(&self) -> u64 {
        *self.number.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_up_from_one() {
        let namer = DebugFileNamer::new();

        assert_eq!("out/Vtop_001_elab", namer.next("out", "Vtop", "elab", 0));
        assert_eq!("out/Vtop_002_elab", namer.next("out", "Vtop", "elab", 0));
        assert_eq!("out/Vtop_003_elab", namer.next("out", "Vtop", "elab", 0));
        assert_eq!(3, namer.current());
    }

    #[test]
    fn explicit_number_resets() {
        let namer = DebugFileNamer::new();

        namer.next("out", "Vtop", "a", 0);
        namer.next("out", "Vtop", "b", 0);

        assert_eq!("out/Vtop_050_dump", namer.next("out", "Vtop", "dump", 50));
        assert_eq!("out/Vtop_051_dump", namer.next("out", "Vtop", "dump", 0));

        assert_eq!("out/Vtop_010_x", namer.next("out", "Vtop", "x", 10));
    }

    #[test]
    fn counts_past_largest_explicit_number() {
        let namer = DebugFileNamer::new();

        assert_eq!("d/p_4294967295_last", namer.next("d", "p", "last", u32::MAX));
        assert_eq!("d/p_4294967296_last", namer.next("d", "p", "last", 0));
        assert_eq!(4294967296, namer.current());
    }

    #[test]
    fn padding_is_a_minimum() {
        let namer = DebugFileNamer::new();

        assert_eq!("d/p_1234_late", namer.next("d", "p", "late", 1234));
        assert_eq!("d/p_1235_late", namer.next("d", "p", "late", 0));
    }
}
