//! Shared helpers for unit tests: a minimal class-file writer and in-memory collaborators.

use std::collections::HashMap;

use crate::model::AccessFlags;

/// Builds syntactically valid class file bytes for tests.
///
/// Only what the reader consumes is emitted: the constant pool, header, fields, methods with
/// an optional `Code` attribute and an optional `BootstrapMethods` attribute. Constant pool
/// references handed out before `build` stay valid.
pub struct ClassBytesBuilder {
    pool: Vec<Vec<u8>>,
    pool_slots: u16,
    utf8_cache: HashMap<String, u16>,
    class_cache: HashMap<String, u16>,
    access: AccessFlags,
    name: String,
    super_name: Option<String>,
    interfaces: Vec<String>,
    fields: Vec<(AccessFlags, String, String)>,
    methods: Vec<(AccessFlags, String, String, Vec<u8>)>,
    bootstrap: Vec<(u16, Vec<u16>)>,
}

impl ClassBytesBuilder {
    pub fn new(name: &str, super_name: Option<&str>) -> Self {
        ClassBytesBuilder {
            pool: Vec::new(),
            pool_slots: 1,
            utf8_cache: HashMap::new(),
            class_cache: HashMap::new(),
            access: AccessFlags::PUBLIC | AccessFlags::SUPER,
            name: name.to_string(),
            super_name: super_name.map(str::to_string),
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            bootstrap: Vec::new(),
        }
    }

    pub fn access(mut self, access: AccessFlags) -> Self {
        self.access = access;
        self
    }

    pub fn interface(mut self, name: &str) -> Self {
        self.interfaces.push(name.to_string());
        self
    }

    pub fn field(mut self, access: AccessFlags, name: &str, descriptor: &str) -> Self {
        self.fields
            .push((access, name.to_string(), descriptor.to_string()));
        self
    }

    /// Adds a method; an empty `code` omits the `Code` attribute.
    pub fn method(mut self, access: AccessFlags, name: &str, descriptor: &str, code: &[u8]) -> Self {
        self.methods.push((
            access,
            name.to_string(),
            descriptor.to_string(),
            code.to_vec(),
        ));
        self
    }

    fn push_entry(&mut self, entry: Vec<u8>) -> u16 {
        let index = self.pool_slots;
        self.pool_slots += if matches!(entry[0], 5 | 6) { 2 } else { 1 };
        self.pool.push(entry);
        index
    }

    pub fn utf8(&mut self, value: &str) -> u16 {
        if let Some(&index) = self.utf8_cache.get(value) {
            return index;
        }
        let mut entry = vec![1];
        entry.extend_from_slice(&(value.len() as u16).to_be_bytes());
        entry.extend_from_slice(value.as_bytes());
        let index = self.push_entry(entry);
        self.utf8_cache.insert(value.to_string(), index);
        index
    }

    pub fn class(&mut self, name: &str) -> u16 {
        if let Some(&index) = self.class_cache.get(name) {
            return index;
        }
        let name_index = self.utf8(name);
        let mut entry = vec![7];
        entry.extend_from_slice(&name_index.to_be_bytes());
        let index = self.push_entry(entry);
        self.class_cache.insert(name.to_string(), index);
        index
    }

    pub fn string(&mut self, value: &str) -> u16 {
        let utf8 = self.utf8(value);
        let mut entry = vec![8];
        entry.extend_from_slice(&utf8.to_be_bytes());
        self.push_entry(entry)
    }

    pub fn integer(&mut self, value: i32) -> u16 {
        let mut entry = vec![3];
        entry.extend_from_slice(&value.to_be_bytes());
        self.push_entry(entry)
    }

    pub fn method_type(&mut self, descriptor: &str) -> u16 {
        let utf8 = self.utf8(descriptor);
        let mut entry = vec![16];
        entry.extend_from_slice(&utf8.to_be_bytes());
        self.push_entry(entry)
    }

    fn name_and_type(&mut self, name: &str, descriptor: &str) -> u16 {
        let name = self.utf8(name);
        let descriptor = self.utf8(descriptor);
        let mut entry = vec![12];
        entry.extend_from_slice(&name.to_be_bytes());
        entry.extend_from_slice(&descriptor.to_be_bytes());
        self.push_entry(entry)
    }

    fn member(&mut self, tag: u8, owner: &str, name: &str, descriptor: &str) -> u16 {
        let class = self.class(owner);
        let name_and_type = self.name_and_type(name, descriptor);
        let mut entry = vec![tag];
        entry.extend_from_slice(&class.to_be_bytes());
        entry.extend_from_slice(&name_and_type.to_be_bytes());
        self.push_entry(entry)
    }

    pub fn field_ref(&mut self, owner: &str, name: &str, descriptor: &str) -> u16 {
        self.member(9, owner, name, descriptor)
    }

    pub fn method_ref(&mut self, owner: &str, name: &str, descriptor: &str) -> u16 {
        self.member(10, owner, name, descriptor)
    }

    pub fn interface_method_ref(&mut self, owner: &str, name: &str, descriptor: &str) -> u16 {
        self.member(11, owner, name, descriptor)
    }

    pub fn method_handle(&mut self, kind: u8, reference: u16) -> u16 {
        let mut entry = vec![15, kind];
        entry.extend_from_slice(&reference.to_be_bytes());
        self.push_entry(entry)
    }

    /// Registers a bootstrap method and returns its index in `BootstrapMethods`.
    pub fn bootstrap_method(&mut self, handle: u16, arguments: &[u16]) -> u16 {
        self.bootstrap.push((handle, arguments.to_vec()));
        (self.bootstrap.len() - 1) as u16
    }

    pub fn invoke_dynamic(&mut self, bootstrap: u16, name: &str, descriptor: &str) -> u16 {
        let name_and_type = self.name_and_type(name, descriptor);
        let mut entry = vec![18];
        entry.extend_from_slice(&bootstrap.to_be_bytes());
        entry.extend_from_slice(&name_and_type.to_be_bytes());
        self.push_entry(entry)
    }

    pub fn build(mut self) -> Vec<u8> {
        let this_class = self.class(&self.name.clone());
        let super_class = match self.super_name.clone() {
            Some(name) => self.class(&name),
            None => 0,
        };
        let interfaces: Vec<u16> = self
            .interfaces
            .clone()
            .iter()
            .map(|name| self.class(name))
            .collect();
        let fields: Vec<(AccessFlags, u16, u16)> = self
            .fields
            .clone()
            .iter()
            .map(|(access, name, descriptor)| (*access, self.utf8(name), self.utf8(descriptor)))
            .collect();
        let code_attribute = self.utf8("Code");
        let methods: Vec<(AccessFlags, u16, u16, Vec<u8>)> = self
            .methods
            .clone()
            .iter()
            .map(|(access, name, descriptor, code)| {
                (*access, self.utf8(name), self.utf8(descriptor), code.clone())
            })
            .collect();
        let bootstrap_attribute = self.utf8("BootstrapMethods");

        let mut out = Vec::new();
        out.extend_from_slice(&0xCAFE_BABE_u32.to_be_bytes());
        out.extend_from_slice(&0_u16.to_be_bytes());
        out.extend_from_slice(&52_u16.to_be_bytes());
        out.extend_from_slice(&self.pool_slots.to_be_bytes());
        for entry in &self.pool {
            out.extend_from_slice(entry);
        }

        out.extend_from_slice(&self.access.bits().to_be_bytes());
        out.extend_from_slice(&this_class.to_be_bytes());
        out.extend_from_slice(&super_class.to_be_bytes());
        out.extend_from_slice(&(interfaces.len() as u16).to_be_bytes());
        for interface in interfaces {
            out.extend_from_slice(&interface.to_be_bytes());
        }

        out.extend_from_slice(&(fields.len() as u16).to_be_bytes());
        for (access, name, descriptor) in fields {
            out.extend_from_slice(&access.bits().to_be_bytes());
            out.extend_from_slice(&name.to_be_bytes());
            out.extend_from_slice(&descriptor.to_be_bytes());
            out.extend_from_slice(&0_u16.to_be_bytes());
        }

        out.extend_from_slice(&(methods.len() as u16).to_be_bytes());
        for (access, name, descriptor, code) in methods {
            out.extend_from_slice(&access.bits().to_be_bytes());
            out.extend_from_slice(&name.to_be_bytes());
            out.extend_from_slice(&descriptor.to_be_bytes());
            if code.is_empty() {
                out.extend_from_slice(&0_u16.to_be_bytes());
                continue;
            }

            out.extend_from_slice(&1_u16.to_be_bytes());
            out.extend_from_slice(&code_attribute.to_be_bytes());
            out.extend_from_slice(&(12 + code.len() as u32).to_be_bytes());
            out.extend_from_slice(&8_u16.to_be_bytes());
            out.extend_from_slice(&8_u16.to_be_bytes());
            out.extend_from_slice(&(code.len() as u32).to_be_bytes());
            out.extend_from_slice(&code);
            // exception table and attributes
            out.extend_from_slice(&0_u16.to_be_bytes());
            out.extend_from_slice(&0_u16.to_be_bytes());
        }

        if self.bootstrap.is_empty() {
            out.extend_from_slice(&0_u16.to_be_bytes());
        } else {
            let mut payload = Vec::new();
            payload.extend_from_slice(&(self.bootstrap.len() as u16).to_be_bytes());
            for (handle, arguments) in &self.bootstrap {
                payload.extend_from_slice(&handle.to_be_bytes());
                payload.extend_from_slice(&(arguments.len() as u16).to_be_bytes());
                for argument in arguments {
                    payload.extend_from_slice(&argument.to_be_bytes());
                }
            }
            out.extend_from_slice(&1_u16.to_be_bytes());
            out.extend_from_slice(&bootstrap_attribute.to_be_bytes());
            out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
            out.extend_from_slice(&payload);
        }

        out
    }
}
