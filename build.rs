const PRIME: u32 = 929;

fn main() {
    let out_dir = std::env::var_os("OUT_DIR").unwrap();
    let dest_path = std::path::Path::new(&out_dir).join("rs_tables.rs");

    let mut src = String::new();

    // ------------------- generator polynomials coefficients LUT generation -------------------
    // NOTE: g_s(x) = (x - 3)(x - 3^2)...(x - 3^k) with k = 2^(s+1), constant term first
    src.push_str("static GEN_COEFF:[&'static[u16];9]=[");
    for level in 0..9 {
        let k = 2_u32 << level;
        let mut coeff = vec![1_u32];
        let mut root = 1;

        for _ in 0..k {
            root = root * 3 % PRIME;

            let mut this = vec![0_u32; coeff.len() + 1];
            for (i, c) in coeff.iter().enumerate() {
                this[i + 1] = (this[i + 1] + c) % PRIME;
                this[i] = (this[i] + PRIME - c * root % PRIME) % PRIME;
            }
            coeff = this;
        }

        src.push_str("&[");
        for c in coeff.iter() {
            src.push_str(&c.to_string());
            src.push(',');
        }
        src.push_str("],");
    }
    src.push_str("];");

    std::fs::write(&dest_path, src).unwrap();
    println!("cargo::rerun-if-changed=build.rs");
}
