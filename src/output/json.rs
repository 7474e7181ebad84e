//
//  stash-client
//  output/json.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! JSON output for `--json`.

use std::io::{self, Write};

use serde::Serialize;

/// Pretty-prints `value` to stdout.
pub fn write_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_json_to(&mut handle, value)
}

pub fn write_json_to<W: Write, T: Serialize + ?Sized>(writer: &mut W, value: &T) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *writer, value)?;
    writeln!(writer)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_json_to_is_pretty_with_newline() {
        let mut buffer = Vec::new();
        write_json_to(&mut buffer, &serde_json::json!({"key": "PROJ"})).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), "{\n  \"key\": \"PROJ\"\n}\n");
    }

    #[test]
    fn test_write_json_to_slices() {
        let mut buffer = Vec::new();
        write_json_to(&mut buffer, &[1, 2][..]).unwrap();
        let parsed: Vec<u32> = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(parsed, vec![1, 2]);
    }
}
