use cfg_aliases::cfg_aliases;

fn main() {
    cfg_aliases! {
        // Any chip selected; gates the register-level backends.
        l0: { any(feature = "l0x1", feature = "l0x2", feature = "l0x3") },
    }
}
