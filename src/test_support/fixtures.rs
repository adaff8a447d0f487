//! Source-tree fixtures.

use std::path::Path;

use tempfile::TempDir;

/// A temporary source tree populated file by file.
pub struct TreeFixture {
    dir: TempDir,
}

impl TreeFixture {
    /// Create an empty tree.
    pub fn new() -> Self {
        TreeFixture {
            dir: TempDir::new().expect("failed to create temp dir"),
        }
    }

    /// A miniature FLINT-like tree: two modules, a header each, a test,
    /// a profile, tuning code, and three memory-management variants.
    pub fn flint_like() -> Self {
        TreeFixture::new()
            .file(
                "fmpz.h",
                "#ifndef FMPZ_H\n#define FMPZ_H\n\nvoid fmpz_add(fmpz_t f, const fmpz_t g,\n    const fmpz_t h);\n\nint fmpz_is_zero(const fmpz_t f);\n\n#endif\n",
            )
            .file(
                "nmod_vec.h",
                "FLINT_INLINE int nmod_vec_ok(void)\n{\n    return 1;\n}\n\nvoid _nmod_vec_add(mp_ptr res, mp_srcptr a, slong len);\n",
            )
            .file("fmpz/add.c", "void fmpz_add(void) {}\n")
            .file("fmpz/is_zero.c", "int fmpz_is_zero(void) { return 0; }\n")
            .file("fmpz/link/fmpz_gc.c", "/* gc */\n")
            .file("fmpz/link/fmpz_single.c", "/* single */\n")
            .file("fmpz/link/fmpz_reentrant.c", "/* reentrant */\n")
            .file("fmpz/test/t-add.c", "int main(void) { return 0; }\n")
            .file("fmpz/tune/tune-add.c", "int main(void) { return 0; }\n")
            .file("nmod_vec/add.c", "void _nmod_vec_add(void) {}\n")
            .file("nmod_vec/test/t-add.c", "int main(void) { return 0; }\n")
            .file("nmod_vec/profile/p-add.c", "int main(void) { return 0; }\n")
            .file("fmpz-conversions-reentrant.in", "#define REENTRANT 1\n")
            .file("fmpz-conversions-single.in", "#define REENTRANT 0\n")
            .file("fft_tuning64.in", "#define FFT_TAB 1\n")
            .file("qadic/CPimport.txt", "1 2 3\n4 5 6\n")
    }

    /// Write a file, creating parent directories.
    pub fn file(self, rel: &str, content: &str) -> Self {
        let path = self.dir.path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("failed to create fixture dir");
        }
        std::fs::write(&path, content).expect("failed to write fixture file");
        self
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Read a file from the tree.
    pub fn read(&self, rel: &str) -> String {
        std::fs::read_to_string(self.dir.path().join(rel)).expect("failed to read fixture file")
    }
}

impl Default for TreeFixture {
    fn default() -> Self {
        Self::new()
    }
}
