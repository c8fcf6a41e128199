// Tue Jan 13 2026 - Alex

use crate::error::ParseError;
use crate::files::atom::AtomHandler;
use crate::files::object::ObjectFile;
use crate::files::Ordinal;
use crate::format::constants::{ARCHIVE_HEADER_SIZE, ARCHIVE_MAGIC};
use crate::format::mapping::InputMapping;
use crate::options::LinkOptions;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct ArchiveMember {
    pub name: String,
    /// Offset of the member's object bytes within the archive.
    pub offset: usize,
    pub len: usize,
    pub mod_time: i64,
    pub ordinal: Ordinal,
}

/// A static archive. Member headers are walked once up front; member
/// contents are parsed lazily, the first time a just-in-time query or a
/// force-load reaches them.
pub struct ArchiveFile {
    path: PathBuf,
    mod_time: i64,
    ordinal: Ordinal,
    mapping: InputMapping,
    members: Vec<ArchiveMember>,
    force_load: bool,
    options: Arc<LinkOptions>,
    parsed_members: RwLock<HashMap<usize, Arc<ObjectFile>>>,
    trace_logged: AtomicBool,
}

impl ArchiveFile {
    pub fn parse(
        mapping: InputMapping,
        path: &Path,
        mod_time: i64,
        ordinal: Ordinal,
        force_load: bool,
        options: Arc<LinkOptions>,
    ) -> Result<Option<Arc<ArchiveFile>>, ParseError> {
        let data = mapping.as_bytes();
        if data.len() < ARCHIVE_MAGIC.len() || &data[..ARCHIVE_MAGIC.len()] != ARCHIVE_MAGIC {
            return Ok(None);
        }
        let malformed = |reason: String| ParseError::Malformed {
            path: path.to_path_buf(),
            reason,
        };

        let mut members = Vec::new();
        let mut off = ARCHIVE_MAGIC.len();
        let mut index: u32 = 0;
        while off + ARCHIVE_HEADER_SIZE <= data.len() {
            let header = &data[off..off + ARCHIVE_HEADER_SIZE];
            if &header[58..60] != b"`\n" {
                return Err(malformed(format!("bad archive member header at {}", off)));
            }
            let name_field = std::str::from_utf8(&header[0..16])
                .map_err(|_| malformed("non-ascii member name".to_string()))?
                .trim_end();
            let mtime: i64 = std::str::from_utf8(&header[16..28])
                .ok()
                .map(str::trim)
                .and_then(|s| s.parse().ok())
                .unwrap_or(0);
            let size: usize = std::str::from_utf8(&header[48..58])
                .ok()
                .map(str::trim)
                .and_then(|s| s.parse().ok())
                .ok_or_else(|| malformed(format!("bad member size at {}", off)))?;

            let mut content = off + ARCHIVE_HEADER_SIZE;
            let mut content_len = size;
            let name = if let Some(len_str) = name_field.strip_prefix("#1/") {
                // BSD extended name: the real name leads the member data
                let name_len: usize = len_str
                    .parse()
                    .map_err(|_| malformed(format!("bad extended name length at {}", off)))?;
                if content + name_len > data.len() || name_len > content_len {
                    return Err(malformed(format!("truncated extended name at {}", off)));
                }
                let raw = &data[content..content + name_len];
                let nul = raw.iter().position(|&b| b == 0).unwrap_or(name_len);
                content += name_len;
                content_len -= name_len;
                String::from_utf8_lossy(&raw[..nul]).into_owned()
            } else {
                name_field.to_string()
            };

            if content + content_len > data.len() {
                return Err(malformed(format!("member {} extends past end of file", name)));
            }

            if !name.starts_with("__.SYMDEF") {
                index += 1;
                members.push(ArchiveMember {
                    name,
                    offset: content,
                    len: content_len,
                    mod_time: mtime,
                    ordinal: ordinal.archive_member(index),
                });
            }

            // member records are 2-byte aligned
            off = content + content_len;
            off += off & 1;
        }

        Ok(Some(Arc::new(ArchiveFile {
            path: path.to_path_buf(),
            mod_time,
            ordinal,
            mapping,
            members,
            force_load,
            options,
            parsed_members: RwLock::new(HashMap::new()),
            trace_logged: AtomicBool::new(false),
        })))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mod_time(&self) -> i64 {
        self.mod_time
    }

    pub fn ordinal(&self) -> Ordinal {
        self.ordinal
    }

    pub fn size(&self) -> usize {
        self.mapping.len()
    }

    pub fn force_load(&self) -> bool {
        self.force_load
    }

    /// Whether every member is pulled up front (-force_load on this file
    /// or -all_load on the link).
    pub fn fully_loaded(&self) -> bool {
        self.force_load || self.options.fully_load_archives
    }

    pub fn members(&self) -> &[ArchiveMember] {
        &self.members
    }

    /// Trace lines are emitted once per archive, the first time a member is
    /// actually used. Returns true exactly once.
    pub fn mark_trace_logged(&self) -> bool {
        !self.trace_logged.swap(true, Ordering::Relaxed)
    }

    fn member_object(&self, index: usize) -> Result<Arc<ObjectFile>, ParseError> {
        if let Some(obj) = self.parsed_members.read().get(&index) {
            return Ok(obj.clone());
        }
        let member = &self.members[index];
        let window = self.mapping.window(member.offset, member.len);
        let member_path = self.path.join(&member.name);
        let parsed = ObjectFile::parse(
            window,
            &member_path,
            member.mod_time,
            member.ordinal,
            &self.options,
        )?
        .ok_or_else(|| ParseError::Malformed {
            path: self.path.clone(),
            reason: format!(
                "archive member '{}' is not an object for the linked architecture",
                member.name
            ),
        })?;
        let obj = Arc::new(parsed);
        self.parsed_members
            .write()
            .entry(index)
            .or_insert_with(|| obj.clone());
        Ok(obj)
    }

    /// Member selection is external policy; this only answers "does some
    /// member define this name" and, on a hit, hands that member's atoms to
    /// the handler. `data_only` restricts the match to data definitions.
    pub fn just_in_time_for_each_atom(
        &self,
        name: &str,
        data_only: bool,
        handler: &mut dyn AtomHandler,
    ) -> Result<bool, ParseError> {
        for index in 0..self.members.len() {
            let obj = self.member_object(index)?;
            if let Some(sym) = obj.defines(name) {
                if data_only && !sym.is_data {
                    continue;
                }
                handler.do_file(obj.path(), obj.ordinal());
                obj.emit_atoms(handler);
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Force-load path: every member contributes all of its atoms.
    pub fn for_each_member_atom(&self, handler: &mut dyn AtomHandler) -> Result<(), ParseError> {
        for index in 0..self.members.len() {
            let obj = self.member_object(index)?;
            handler.do_file(obj.path(), obj.ordinal());
            obj.emit_atoms(handler);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_member(name: &str, payload: &[u8]) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(format!("{:<16}", name).as_bytes());
        data.extend_from_slice(format!("{:<12}", 0).as_bytes());
        data.extend_from_slice(format!("{:<6}", 0).as_bytes());
        data.extend_from_slice(format!("{:<6}", 0).as_bytes());
        data.extend_from_slice(format!("{:<8}", "100644").as_bytes());
        data.extend_from_slice(format!("{:<10}", payload.len()).as_bytes());
        data.extend_from_slice(b"`\n");
        data.extend_from_slice(payload);
        if data.len() & 1 == 1 {
            data.push(b'\n');
        }
        data
    }

    fn archive_bytes(members: &[(&str, &[u8])]) -> Vec<u8> {
        let mut data = ARCHIVE_MAGIC.to_vec();
        for (name, payload) in members {
            data.extend_from_slice(&raw_member(name, payload));
        }
        data
    }

    #[test]
    fn test_member_walk_skips_symdef() {
        let bytes = archive_bytes(&[
            ("__.SYMDEF", b"ranlib"),
            ("a.o", b"0123"),
            ("b.o", b"456789"),
        ]);
        let archive = ArchiveFile::parse(
            InputMapping::from_vec(bytes),
            Path::new("libx.a"),
            0,
            Ordinal::command_line(0),
            false,
            Arc::new(LinkOptions::default()),
        )
        .unwrap()
        .unwrap();
        let names: Vec<&str> = archive.members().iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["a.o", "b.o"]);
        assert_eq!(archive.members()[0].len, 4);
        assert_eq!(archive.members()[1].len, 6);
    }

    #[test]
    fn test_bsd_extended_names() {
        let mut payload = b"long_member_name.o\0\0".to_vec();
        payload.extend_from_slice(b"payload!");
        let bytes = archive_bytes(&[("#1/20", &payload)]);
        let archive = ArchiveFile::parse(
            InputMapping::from_vec(bytes),
            Path::new("liby.a"),
            0,
            Ordinal::command_line(0),
            false,
            Arc::new(LinkOptions::default()),
        )
        .unwrap()
        .unwrap();
        assert_eq!(archive.members()[0].name, "long_member_name.o");
        assert_eq!(archive.members()[0].len, 8);
    }

    #[test]
    fn test_not_an_archive() {
        let parsed = ArchiveFile::parse(
            InputMapping::from_vec(b"not an archive at all".to_vec()),
            Path::new("x"),
            0,
            Ordinal::command_line(0),
            false,
            Arc::new(LinkOptions::default()),
        )
        .unwrap();
        assert!(parsed.is_none());
    }

    #[test]
    fn test_member_ordinals_follow_archive() {
        let bytes = archive_bytes(&[("a.o", b"00"), ("b.o", b"11")]);
        let ord = Ordinal::command_line(7);
        let archive = ArchiveFile::parse(
            InputMapping::from_vec(bytes),
            Path::new("libz.a"),
            0,
            ord,
            false,
            Arc::new(LinkOptions::default()),
        )
        .unwrap()
        .unwrap();
        assert!(ord < archive.members()[0].ordinal);
        assert!(archive.members()[0].ordinal < archive.members()[1].ordinal);
        assert!(archive.members()[1].ordinal < Ordinal::command_line(8));
    }

    #[test]
    fn test_trace_logged_once() {
        let bytes = archive_bytes(&[("a.o", b"00")]);
        let archive = ArchiveFile::parse(
            InputMapping::from_vec(bytes),
            Path::new("liba.a"),
            0,
            Ordinal::command_line(0),
            false,
            Arc::new(LinkOptions::default()),
        )
        .unwrap()
        .unwrap();
        assert!(archive.mark_trace_logged());
        assert!(!archive.mark_trace_logged());
    }
}
