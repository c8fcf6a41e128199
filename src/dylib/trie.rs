// Tue Jan 13 2026 - Alex

use crate::format::constants::*;
use std::collections::HashSet;

#[derive(Debug, Clone)]
pub struct TrieExport {
    pub name: String,
    pub flags: u64,
    pub address: u64,
}

fn read_uleb(data: &[u8], p: &mut usize) -> Result<u64, String> {
    let mut result: u64 = 0;
    let mut shift = 0u32;
    loop {
        let byte = *data.get(*p).ok_or("export trie extends past end of data")?;
        *p += 1;
        if shift >= 64 {
            return Err("uleb128 too big for 64-bits".to_string());
        }
        result |= ((byte & 0x7f) as u64) << shift;
        if byte & 0x80 == 0 {
            return Ok(result);
        }
        shift += 7;
    }
}

fn read_cstr<'a>(data: &'a [u8], p: &mut usize) -> Result<&'a str, String> {
    let tail = data
        .get(*p..)
        .ok_or("export trie extends past end of data")?;
    let nul = tail
        .iter()
        .position(|&b| b == 0)
        .ok_or("unterminated string in export trie")?;
    let s = std::str::from_utf8(&tail[..nul]).map_err(|_| "non-utf8 export name".to_string())?;
    *p += nul + 1;
    Ok(s)
}

/// Walks the compressed export trie, producing every (name, flags, address)
/// triple. Re-export entries carry address zero. Malformed offsets and
/// repeated nodes (a cycle) are errors, not panics.
pub fn parse_export_trie(data: &[u8]) -> Result<Vec<TrieExport>, String> {
    let mut out = Vec::new();
    if data.is_empty() {
        return Ok(out);
    }
    let mut stack: Vec<(usize, String)> = vec![(0, String::new())];
    let mut visited = HashSet::new();
    while let Some((node, prefix)) = stack.pop() {
        if !visited.insert(node) {
            return Err("cycle in export trie".to_string());
        }
        let mut p = node;
        let terminal_size = read_uleb(data, &mut p)? as usize;
        if terminal_size != 0 {
            let mut q = p;
            let flags = read_uleb(data, &mut q)?;
            let address = if flags & EXPORT_SYMBOL_FLAGS_REEXPORT != 0 {
                let _ordinal = read_uleb(data, &mut q)?;
                let _imported_name = read_cstr(data, &mut q)?;
                0
            } else {
                let addr = read_uleb(data, &mut q)?;
                if flags & EXPORT_SYMBOL_FLAGS_STUB_AND_RESOLVER != 0 {
                    let _resolver = read_uleb(data, &mut q)?;
                }
                addr
            };
            out.push(TrieExport {
                name: prefix.clone(),
                flags,
                address,
            });
        }
        let mut p = p
            .checked_add(terminal_size)
            .ok_or("terminal info extends past end of trie")?;
        if p > data.len() {
            return Err("terminal info extends past end of trie".to_string());
        }
        let child_count = *data.get(p).ok_or("export trie extends past end of data")?;
        p += 1;
        for _ in 0..child_count {
            let label = read_cstr(data, &mut p)?;
            let child = read_uleb(data, &mut p)? as usize;
            if child >= data.len() {
                return Err("export trie child offset out of range".to_string());
            }
            stack.push((child, format!("{}{}", prefix, label)));
        }
    }
    Ok(out)
}

#[cfg(test)]
pub mod build {
    //! Tiny trie writer used by the tests; emits the same layout the
    //! parser reads.

    struct Node {
        label: String,
        terminal: Option<(u64, u64)>, // (flags, address)
        children: Vec<Node>,
    }

    fn uleb(mut v: u64, out: &mut Vec<u8>) {
        loop {
            let mut byte = (v & 0x7f) as u8;
            v >>= 7;
            if v != 0 {
                byte |= 0x80;
            }
            out.push(byte);
            if v == 0 {
                break;
            }
        }
    }

    pub fn build_trie(symbols: &[(&str, u64, u64)]) -> Vec<u8> {
        let mut root = Node {
            label: String::new(),
            terminal: None,
            children: Vec::new(),
        };
        for &(name, flags, address) in symbols {
            insert(&mut root, name, flags, address);
        }
        // lay nodes out breadth-first with fixed-width (3-byte) offsets so
        // sizing stays simple
        let mut order = Vec::new();
        flatten(&root, &mut order);
        let mut offsets = vec![0usize; order.len()];
        let mut at = 0usize;
        for (i, node) in order.iter().enumerate() {
            offsets[i] = at;
            at += node_size(node);
        }
        let mut out = Vec::new();
        for (i, node) in order.iter().enumerate() {
            let mut body = Vec::new();
            if let Some((flags, address)) = node.terminal {
                uleb(flags, &mut body);
                uleb(address, &mut body);
            }
            let mut blob = Vec::new();
            uleb(body.len() as u64, &mut blob);
            blob.extend_from_slice(&body);
            blob.push(node.children.len() as u8);
            let mut child_index = child_base(&order, i);
            for child in &node.children {
                blob.extend_from_slice(child.label.as_bytes());
                blob.push(0);
                // fixed 3-byte uleb
                let off = offsets[child_index] as u64;
                blob.push((off & 0x7f) as u8 | 0x80);
                blob.push(((off >> 7) & 0x7f) as u8 | 0x80);
                blob.push(((off >> 14) & 0x7f) as u8);
                child_index += 1;
            }
            assert_eq!(blob.len(), node_size(node));
            out.extend_from_slice(&blob);
        }
        out
    }

    fn insert(node: &mut Node, rest: &str, flags: u64, address: u64) {
        if rest.is_empty() {
            node.terminal = Some((flags, address));
            return;
        }
        // one child per remaining suffix keeps the writer trivial
        let first = rest.chars().next().unwrap().to_string();
        let tail = &rest[first.len()..];
        if let Some(child) = node.children.iter_mut().find(|c| c.label == first) {
            insert(child, tail, flags, address);
        } else {
            let mut child = Node {
                label: first,
                terminal: None,
                children: Vec::new(),
            };
            insert(&mut child, tail, flags, address);
            node.children.push(child);
        }
    }

    fn flatten<'a>(root: &'a Node, out: &mut Vec<&'a Node>) {
        let mut queue = std::collections::VecDeque::new();
        queue.push_back(root);
        while let Some(node) = queue.pop_front() {
            out.push(node);
            for child in &node.children {
                queue.push_back(child);
            }
        }
    }

    fn child_base(order: &[&Node], index: usize) -> usize {
        // in breadth-first order, the children of node i start right after
        // all children of nodes 0..i
        let mut base = 1;
        for node in order.iter().take(index) {
            base += node.children.len();
        }
        base
    }

    fn node_size(node: &Node) -> usize {
        let mut body = 0usize;
        if let Some((flags, address)) = node.terminal {
            body += uleb_len(flags) + uleb_len(address);
        }
        let mut size = uleb_len(body as u64) + body + 1;
        for child in &node.children {
            size += child.label.len() + 1 + 3;
        }
        size
    }

    fn uleb_len(v: u64) -> usize {
        let mut len = 1;
        let mut v = v >> 7;
        while v != 0 {
            len += 1;
            v >>= 7;
        }
        len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_simple() {
        let data = build::build_trie(&[
            ("_foo", 0, 0x1000),
            ("_foobar", EXPORT_SYMBOL_FLAGS_WEAK_DEFINITION, 0x2000),
            ("_bar", 0, 0x3000),
        ]);
        let mut exports = parse_export_trie(&data).unwrap();
        exports.sort_by(|a, b| a.name.cmp(&b.name));
        assert_eq!(exports.len(), 3);
        assert_eq!(exports[0].name, "_bar");
        assert_eq!(exports[0].address, 0x3000);
        assert_eq!(exports[2].name, "_foobar");
        assert_eq!(
            exports[2].flags & EXPORT_SYMBOL_FLAGS_WEAK_DEFINITION,
            EXPORT_SYMBOL_FLAGS_WEAK_DEFINITION
        );
    }

    #[test]
    fn test_empty_trie() {
        assert!(parse_export_trie(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_truncated_trie_is_error() {
        let data = build::build_trie(&[("_foo", 0, 0x1000)]);
        assert!(parse_export_trie(&data[..data.len() / 2]).is_err());
    }

    #[test]
    fn test_cyclic_trie_is_error() {
        // node that lists itself as a child: terminal size 0, one child,
        // label "a", offset 0
        let data = [0u8, 1, b'a', 0, 0];
        assert!(parse_export_trie(&data).is_err());
    }

    #[test]
    fn test_uleb_overflow() {
        let data = [0x80u8, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x01];
        let mut p = 0;
        assert!(read_uleb(&data, &mut p).is_err());
    }
}
