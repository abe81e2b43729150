//! Remapping of whole class models.

use std::collections::HashSet;

use rayon::prelude::*;

use crate::{
    mapping::{descriptor::return_type_name, Domain, NameDictionary},
    model::{
        handle_kind, opcodes, ClassNode, Constant, DynamicCall, FieldNode, Handle, Instruction,
        MemberRef, MethodNode, Operand,
    },
    remap::Remapper,
};

const LAMBDA_METAFACTORY: &str = "java/lang/invoke/LambdaMetafactory";

/// Applies a [`Remapper`] to every name in a [`ClassNode`].
///
/// Field declarations are processed before method bodies so that fields declared by the
/// class itself take precedence over inherited ones of the same name when the instructions
/// are remapped.
///
/// With a [`NameDictionary`] attached, member names the remapper leaves unchanged are looked
/// up in the dictionary as a last resort, and string constants in the static initializers of
/// selected classes are translated as member names.
#[derive(Debug, Clone)]
pub struct ClassRemapper<'a> {
    remapper: &'a Remapper,
    dictionary: Option<&'a NameDictionary>,
    string_classes: HashSet<String>,
}

impl<'a> ClassRemapper<'a> {
    /// Creates a class remapper driven by `remapper`.
    #[must_use]
    pub fn new(remapper: &'a Remapper) -> Self {
        ClassRemapper {
            remapper,
            dictionary: None,
            string_classes: HashSet::new(),
        }
    }

    /// Attaches a dictionary for member names the remapper does not know.
    #[must_use]
    pub fn with_dictionary(mut self, dictionary: &'a NameDictionary) -> Self {
        self.dictionary = Some(dictionary);
        self
    }

    /// Translates string constants in the static initializer of the given classes through
    /// the dictionary. Names may be given in either spelling.
    #[must_use]
    pub fn translate_strings_in<I, S>(mut self, classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.string_classes
            .extend(classes.into_iter().map(Into::into));
        self
    }

    /// Returns a remapped copy of `class`.
    #[must_use]
    pub fn remap(&self, class: &ClassNode) -> ClassNode {
        let mut class = class.clone();
        self.remap_in_place(&mut class);
        class
    }

    /// Remaps `classes` in parallel.
    #[must_use]
    pub fn remap_all(&self, classes: &[ClassNode]) -> Vec<ClassNode> {
        for class in classes {
            self.remapper.declare_class(class);
        }
        classes.par_iter().map(|class| self.remap(class)).collect()
    }

    /// Remaps `class` in place.
    pub fn remap_in_place(&self, class: &mut ClassNode) {
        self.remapper.declare_class(class);

        let owner = class.name.clone();
        let mapped_owner = self.remapper.map_type(&owner);
        let translate_strings = self.dictionary.is_some()
            && (self.string_classes.contains(&owner) || self.string_classes.contains(&mapped_owner));

        for field in &mut class.fields {
            self.remap_field(&owner, field);
        }
        for method in &mut class.methods {
            self.remap_method(&owner, method, translate_strings);
        }

        class.name = mapped_owner;
        class.super_name = class
            .super_name
            .as_deref()
            .map(|name| self.remapper.map_type(name));
        for interface in &mut class.interfaces {
            *interface = self.remapper.map_type(interface);
        }
        class.signature = self.signature(class.signature.as_deref());

        tracing::trace!(from = %owner, to = %class.name, "remapped class");
    }

    fn remap_field(&self, owner: &str, field: &mut FieldNode) {
        let name = self
            .remapper
            .map_member_field_name(owner, &field.name, &field.descriptor);
        field.name = self.fallback(Domain::Field, &field.name, name);
        field.descriptor = self.remapper.map_descriptor(&field.descriptor);
        field.signature = self.signature(field.signature.as_deref());
    }

    fn remap_method(&self, owner: &str, method: &mut MethodNode, translate_strings: bool) {
        let strings = translate_strings && method.name == "<clinit>";

        if !method.is_initializer() {
            let name = self
                .remapper
                .map_method(owner, &method.name, &method.descriptor);
            method.name = self.fallback(Domain::Any, &method.name, name);
        }
        method.descriptor = self.remapper.map_method_descriptor(&method.descriptor);
        method.signature = self.signature(method.signature.as_deref());
        for exception in &mut method.exceptions {
            *exception = self.remapper.map_type(exception);
        }

        for instruction in method.instructions_mut() {
            self.remap_instruction(instruction, strings);
        }
    }

    fn remap_instruction(&self, instruction: &mut Instruction, strings: bool) {
        let opcode = instruction.opcode;
        match &mut instruction.operand {
            Operand::Field(member) => {
                *member = self.field_ref(member);
                if opcode == opcodes::GETSTATIC {
                    if let Some(declared) =
                        self.remapper.static_field_type(&member.owner, &member.name)
                    {
                        if declared != member.descriptor {
                            tracing::debug!(
                                owner = %member.owner,
                                name = %member.name,
                                from = %member.descriptor,
                                to = %declared,
                                "static field type changed"
                            );
                            member.descriptor = self.remapper.map_descriptor(&declared);
                        }
                    }
                }
            }
            Operand::Method(member) => *member = self.method_ref(member),
            Operand::InvokeDynamic(call) => self.remap_invoke_dynamic(call),
            Operand::Type(name) => *name = self.remapper.map_internal_or_array(name),
            Operand::Constant(constant) => self.remap_constant(constant, strings),
            Operand::MultiNewArray { descriptor, .. } => {
                *descriptor = self.remapper.map_descriptor(descriptor);
            }
            _ => {}
        }
    }

    fn remap_invoke_dynamic(&self, call: &mut DynamicCall) {
        if is_lambda_metafactory(&call.bootstrap) {
            // the implemented method belongs to the functional interface returned by the site
            let sam = match call.arguments.first() {
                Some(Constant::MethodType(descriptor)) => Some(descriptor.clone()),
                _ => None,
            };
            if let (Some(owner), Some(sam)) = (return_type_name(&call.descriptor), sam) {
                let name = self.remapper.map_method(owner, &call.name, &sam);
                call.name = self.fallback(Domain::Method, &call.name, name);
            }
        }

        call.descriptor = self.remapper.map_method_descriptor(&call.descriptor);
        self.remap_handle(&mut call.bootstrap);
        for argument in &mut call.arguments {
            self.remap_constant(argument, false);
        }
    }

    fn remap_constant(&self, constant: &mut Constant, strings: bool) {
        match constant {
            Constant::Type(name) => *name = self.remapper.map_internal_or_array(name),
            Constant::MethodType(descriptor) => {
                *descriptor = self.remapper.map_method_descriptor(descriptor);
            }
            Constant::Handle(handle) => self.remap_handle(handle),
            Constant::Dynamic(call) => {
                call.descriptor = self.remapper.map_descriptor(&call.descriptor);
                self.remap_handle(&mut call.bootstrap);
                for argument in &mut call.arguments {
                    self.remap_constant(argument, false);
                }
            }
            Constant::String(value) if strings => {
                if let Some(dictionary) = self.dictionary {
                    *value = dictionary.translate(value);
                }
            }
            _ => {}
        }
    }

    fn remap_handle(&self, handle: &mut Handle) {
        handle.member = if handle_kind::is_field(handle.kind) {
            self.field_ref(&handle.member)
        } else {
            self.method_ref(&handle.member)
        };
    }

    fn field_ref(&self, member: &MemberRef) -> MemberRef {
        let name = self
            .remapper
            .map_field(&member.owner, &member.name, Some(&member.descriptor));
        MemberRef {
            owner: self.remapper.map_internal_or_array(&member.owner),
            name: self.fallback(Domain::Field, &member.name, name),
            descriptor: self.remapper.map_descriptor(&member.descriptor),
            interface: member.interface,
        }
    }

    fn method_ref(&self, member: &MemberRef) -> MemberRef {
        let name = if member.name.starts_with('<') {
            member.name.clone()
        } else {
            let name = self
                .remapper
                .map_method(&member.owner, &member.name, &member.descriptor);
            self.fallback(Domain::Any, &member.name, name)
        };
        MemberRef {
            owner: self.remapper.map_internal_or_array(&member.owner),
            name,
            descriptor: self.remapper.map_method_descriptor(&member.descriptor),
            interface: member.interface,
        }
    }

    fn signature(&self, signature: Option<&str>) -> Option<String> {
        self.remapper.map_signature(signature?)
    }

    /// Consults the dictionary when the remapper left `original` unchanged.
    fn fallback(&self, domain: Domain, original: &str, mapped: String) -> String {
        if mapped != original {
            return mapped;
        }
        self.dictionary
            .and_then(|dictionary| dictionary.lookup(domain, original))
            .map_or(mapped, str::to_string)
    }
}

fn is_lambda_metafactory(handle: &Handle) -> bool {
    handle.member.owner == LAMBDA_METAFACTORY
        && matches!(handle.member.name.as_str(), "metafactory" | "altMetafactory")
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        classfile::{read_class, ClassHeaderReader},
        config::RemapperConfig,
        hierarchy::MemoryProvider,
        mapping::{MappingRecordParser, MappingStage},
        model::{AccessFlags, Code},
        test::ClassBytesBuilder,
    };

    const LINES: &[&str] = &[
        "CL: a net/example/Widget",
        "CL: g net/example/Gadget",
        "CL: r net/example/Action",
        "FD: a/b net/example/Widget/count",
        "FD: g/i net/example/Gadget/INSTANCE",
        "MD: a/c (Lg;)V net/example/Widget/attach (Lnet/example/Gadget;)V",
        "MD: g/d ()La; net/example/Gadget/owner ()Lnet/example/Widget;",
        "MD: r/e ()V net/example/Action/perform ()V",
    ];

    fn remapper(provider: MemoryProvider) -> Remapper {
        Remapper::with_config(
            MappingStage::from_lines(LINES).unwrap(),
            Arc::new(provider),
            Arc::new(ClassHeaderReader),
            &RemapperConfig::minimal(),
        )
    }

    fn instruction(opcode: u8, operand: Operand) -> Instruction {
        Instruction {
            offset: 0,
            opcode,
            operand,
        }
    }

    fn widget() -> ClassNode {
        let mut class = ClassNode::new("a", Some("java/lang/Object"));
        class.interfaces.push("r".to_string());
        class.signature = Some("Ljava/lang/Object;Ljava/lang/Comparable<La;>;".to_string());
        class.fields.push(FieldNode::new(AccessFlags::PRIVATE, "b", "I"));

        let mut attach = MethodNode::new(AccessFlags::PUBLIC, "c", "(Lg;)V");
        attach.exceptions.push("g".to_string());
        attach.code = Some(Code {
            max_stack: 2,
            max_locals: 2,
            instructions: vec![
                instruction(opcodes::ALOAD_0, Operand::None),
                instruction(opcodes::GETFIELD, Operand::Field(MemberRef::new("a", "b", "I"))),
                instruction(opcodes::NEW, Operand::Type("g".to_string())),
                instruction(
                    opcodes::INVOKEVIRTUAL,
                    Operand::Method(MemberRef::new("g", "d", "()La;")),
                ),
                instruction(opcodes::ANEWARRAY, Operand::Type("[La;".to_string())),
                instruction(
                    opcodes::LDC,
                    Operand::Constant(Constant::Type("g".to_string())),
                ),
                instruction(
                    opcodes::MULTIANEWARRAY,
                    Operand::MultiNewArray {
                        descriptor: "[[La;".to_string(),
                        dimensions: 2,
                    },
                ),
                instruction(
                    opcodes::INVOKESPECIAL,
                    Operand::Method(MemberRef::new("java/lang/Object", "<init>", "()V")),
                ),
                instruction(opcodes::RETURN, Operand::None),
            ],
        });
        class.methods.push(MethodNode::new(AccessFlags::PUBLIC, "<init>", "()V"));
        class.methods.push(attach);
        class
    }

    #[test]
    fn remaps_declarations_and_operands() {
        let remapper = remapper(MemoryProvider::new());
        let class = ClassRemapper::new(&remapper).remap(&widget());

        assert_eq!(class.name, "net/example/Widget");
        assert_eq!(class.interfaces, vec!["net/example/Action"]);
        assert_eq!(
            class.signature.as_deref(),
            Some("Ljava/lang/Object;Ljava/lang/Comparable<Lnet/example/Widget;>;")
        );
        assert_eq!(class.fields[0].name, "count");
        assert_eq!(class.methods[0].name, "<init>");

        let attach = &class.methods[1];
        assert_eq!(attach.name, "attach");
        assert_eq!(attach.descriptor, "(Lnet/example/Gadget;)V");
        assert_eq!(attach.exceptions, vec!["net/example/Gadget"]);

        let operands: Vec<&Operand> = attach.instructions().map(|i| &i.operand).collect();
        assert_eq!(
            operands[1],
            &Operand::Field(MemberRef::new("net/example/Widget", "count", "I"))
        );
        assert_eq!(operands[2], &Operand::Type("net/example/Gadget".to_string()));
        assert_eq!(
            operands[3],
            &Operand::Method(MemberRef::new(
                "net/example/Gadget",
                "owner",
                "()Lnet/example/Widget;"
            ))
        );
        assert_eq!(operands[4], &Operand::Type("[Lnet/example/Widget;".to_string()));
        assert_eq!(
            operands[5],
            &Operand::Constant(Constant::Type("net/example/Gadget".to_string()))
        );
        assert_eq!(
            operands[6],
            &Operand::MultiNewArray {
                descriptor: "[[Lnet/example/Widget;".to_string(),
                dimensions: 2
            }
        );
        assert_eq!(
            operands[7],
            &Operand::Method(MemberRef::new("java/lang/Object", "<init>", "()V"))
        );
    }

    #[test]
    fn lambda_metafactory_name() {
        let mut builder = ClassBytesBuilder::new("a", Some("java/lang/Object"));
        let factory = builder.method_ref(
            LAMBDA_METAFACTORY,
            "metafactory",
            "(Ljava/lang/invoke/MethodHandles$Lookup;Ljava/lang/String;Ljava/lang/invoke/MethodType;Ljava/lang/invoke/MethodType;Ljava/lang/invoke/MethodHandle;Ljava/lang/invoke/MethodType;)Ljava/lang/invoke/CallSite;",
        );
        let factory = builder.method_handle(handle_kind::INVOKE_STATIC, factory);
        let sam = builder.method_type("()V");
        let target = builder.method_ref("a", "lambda$0", "()V");
        let target = builder.method_handle(handle_kind::INVOKE_STATIC, target);
        let bootstrap = builder.bootstrap_method(factory, &[sam, target, sam]);
        let site = builder.invoke_dynamic(bootstrap, "e", "()Lr;");
        let [high, low] = site.to_be_bytes();
        let bytes = builder
            .method(
                AccessFlags::STATIC,
                "make",
                "()Lr;",
                &[opcodes::INVOKEDYNAMIC, high, low, 0, 0, opcodes::ARETURN],
            )
            .build();

        let remapper = remapper(MemoryProvider::new());
        let class = ClassRemapper::new(&remapper).remap(&read_class(&bytes).unwrap());

        let Operand::InvokeDynamic(call) = &class.methods[0].instructions().next().unwrap().operand
        else {
            panic!("expected invokedynamic");
        };
        assert_eq!(call.name, "perform");
        assert_eq!(call.descriptor, "()Lnet/example/Action;");
        assert_eq!(call.bootstrap.member.owner, LAMBDA_METAFACTORY);
        assert_eq!(
            call.arguments[1],
            Constant::Handle(Handle {
                kind: handle_kind::INVOKE_STATIC,
                member: MemberRef::new("net/example/Widget", "lambda$0", "()V"),
            })
        );
    }

    #[test]
    fn getstatic_descriptor_follows_declaration() {
        let provider = MemoryProvider::new().with_class(
            "net/example/Gadget",
            ClassBytesBuilder::new("net/example/Gadget", Some("java/lang/Object"))
                .field(
                    AccessFlags::PUBLIC | AccessFlags::STATIC,
                    "INSTANCE",
                    "Lnet/example/Action;",
                )
                .build(),
        );
        let remapper = remapper(provider);

        let mut class = ClassNode::new("a", Some("java/lang/Object"));
        let mut method = MethodNode::new(AccessFlags::STATIC, "f", "()V");
        method.code = Some(Code {
            instructions: vec![
                instruction(
                    opcodes::GETSTATIC,
                    Operand::Field(MemberRef::new("g", "i", "Lg;")),
                ),
                instruction(
                    opcodes::PUTSTATIC,
                    Operand::Field(MemberRef::new("g", "i", "Lg;")),
                ),
            ],
            ..Code::default()
        });
        class.methods.push(method);

        let class = ClassRemapper::new(&remapper).remap(&class);
        let fields: Vec<&MemberRef> = class.methods[0]
            .instructions()
            .filter_map(Instruction::field_ref)
            .collect();
        assert_eq!(fields[0].name, "INSTANCE");
        assert_eq!(fields[0].descriptor, "Lnet/example/Action;");
        assert_eq!(fields[1].descriptor, "Lnet/example/Gadget;");
    }

    #[test]
    fn dictionary_fallback_and_strings() {
        let records = MappingRecordParser::new()
            .parse([
                "FD: x/Y/field_1_a x/Y/speed",
                "MD: x/Y/func_2_b ()V x/Y/tick ()V",
            ])
            .records;
        let dictionary = NameDictionary::from_records(&records);
        let remapper = Remapper::identity();

        let mut class = ClassNode::new("optifine/EntityUtils", Some("java/lang/Object"));
        let mut clinit = MethodNode::new(AccessFlags::STATIC, "<clinit>", "()V");
        clinit.code = Some(Code {
            instructions: vec![
                instruction(
                    opcodes::LDC,
                    Operand::Constant(Constant::String("field_1_a".to_string())),
                ),
                instruction(
                    opcodes::INVOKEVIRTUAL,
                    Operand::Method(MemberRef::new("x/Y", "func_2_b", "()V")),
                ),
            ],
            ..Code::default()
        });
        class.methods.push(clinit);

        let plain = ClassRemapper::new(&remapper)
            .with_dictionary(&dictionary)
            .remap(&class);
        let operands: Vec<&Operand> = plain.methods[0].instructions().map(|i| &i.operand).collect();
        assert_eq!(
            operands[0],
            &Operand::Constant(Constant::String("field_1_a".to_string()))
        );
        assert_eq!(operands[1], &Operand::Method(MemberRef::new("x/Y", "tick", "()V")));

        let translated = ClassRemapper::new(&remapper)
            .with_dictionary(&dictionary)
            .translate_strings_in(["optifine/EntityUtils"])
            .remap(&class);
        assert_eq!(
            translated.methods[0].instructions().next().unwrap().operand,
            Operand::Constant(Constant::String("speed".to_string()))
        );
    }

    fn calling_class(name: &str, super_name: &str) -> ClassNode {
        let mut class = ClassNode::new(name, Some(super_name));
        let mut run = MethodNode::new(AccessFlags::PUBLIC, "run", "()V");
        run.code = Some(Code {
            max_stack: 1,
            max_locals: 1,
            instructions: vec![
                instruction(opcodes::ALOAD_0, Operand::None),
                instruction(
                    opcodes::INVOKEVIRTUAL,
                    Operand::Method(MemberRef::new(name, "m", "()V")),
                ),
                instruction(opcodes::RETURN, Operand::None),
            ],
        });
        class.methods.push(run);
        class
    }

    fn called_name(class: &ClassNode) -> Option<&str> {
        class.methods[0].instructions().find_map(|i| match &i.operand {
            Operand::Method(method) => Some(method.name.as_str()),
            _ => None,
        })
    }

    #[test]
    fn inherited_members_of_unprovided_class() {
        let remapper = Remapper::with_config(
            MappingStage::from_lines(["CL: a net/example/Base", "MD: a/m ()V net/example/Base/tick ()V"])
                .unwrap(),
            Arc::new(MemoryProvider::new()),
            Arc::new(ClassHeaderReader),
            &RemapperConfig::minimal(),
        );
        let remapper = ClassRemapper::new(&remapper);

        let extra = remapper.remap(&calling_class("net/patch/Extra", "a"));
        assert_eq!(extra.super_name.as_deref(), Some("net/example/Base"));
        assert_eq!(called_name(&extra), Some("tick"));

        // a batch declares every class before remapping, whatever the order
        let batch = remapper.remap_all(&[
            calling_class("net/patch/Child", "net/patch/Parent"),
            calling_class("net/patch/Parent", "a"),
        ]);
        assert_eq!(called_name(&batch[0]), Some("tick"));
        assert_eq!(called_name(&batch[1]), Some("tick"));
    }

    #[test]
    fn remap_all_in_parallel() {
        let remapper = remapper(MemoryProvider::new());
        let classes = vec![widget(), ClassNode::new("g", Some("java/lang/Object"))];

        let remapped = ClassRemapper::new(&remapper).remap_all(&classes);
        assert_eq!(remapped[0].name, "net/example/Widget");
        assert_eq!(remapped[1].name, "net/example/Gadget");
    }
}
