//! Decode/encode round-trip tests.
//!
//! Verifies that `decode(encode(i)) == i` holds across the supported
//! subset, and that unknown encodings are rejected.

use mips_core::common::error::Trap;
use mips_core::isa::decode::decode;
use mips_core::isa::instruction::{encode_cop0, encode_i, encode_j, encode_r, encode_regimm, Op};
use mips_core::isa::opcodes::{cop0, funct, op, regimm};

/// Representative encodings with non-trivial field values, one per operation.
fn sample_words() -> Vec<(u32, Op)> {
    vec![
        (encode_r(funct::SLL, 0, 9, 8, 7), Op::Sll),
        (encode_r(funct::SRL, 0, 9, 8, 3), Op::Srl),
        (encode_r(funct::SRA, 0, 9, 8, 31), Op::Sra),
        (encode_r(funct::SLLV, 10, 9, 8, 0), Op::Sllv),
        (encode_r(funct::SRLV, 10, 9, 8, 0), Op::Srlv),
        (encode_r(funct::SRAV, 10, 9, 8, 0), Op::Srav),
        (encode_r(funct::JR, 31, 0, 0, 0), Op::Jr),
        (encode_r(funct::JALR, 25, 0, 31, 0), Op::Jalr),
        (encode_r(funct::SYSCALL, 0, 0, 0, 0), Op::Syscall),
        (encode_r(funct::BREAK, 0, 0, 0, 0), Op::Break),
        (encode_r(funct::MFHI, 0, 0, 12, 0), Op::Mfhi),
        (encode_r(funct::MTHI, 12, 0, 0, 0), Op::Mthi),
        (encode_r(funct::MFLO, 0, 0, 12, 0), Op::Mflo),
        (encode_r(funct::MTLO, 12, 0, 0, 0), Op::Mtlo),
        (encode_r(funct::MULT, 4, 5, 0, 0), Op::Mult),
        (encode_r(funct::MULTU, 4, 5, 0, 0), Op::Multu),
        (encode_r(funct::DIV, 4, 5, 0, 0), Op::Div),
        (encode_r(funct::DIVU, 4, 5, 0, 0), Op::Divu),
        (encode_r(funct::ADD, 1, 2, 3, 0), Op::Add),
        (encode_r(funct::ADDU, 1, 2, 3, 0), Op::Addu),
        (encode_r(funct::SUB, 1, 2, 3, 0), Op::Sub),
        (encode_r(funct::SUBU, 1, 2, 3, 0), Op::Subu),
        (encode_r(funct::AND, 1, 2, 3, 0), Op::And),
        (encode_r(funct::OR, 1, 2, 3, 0), Op::Or),
        (encode_r(funct::XOR, 1, 2, 3, 0), Op::Xor),
        (encode_r(funct::NOR, 1, 2, 3, 0), Op::Nor),
        (encode_r(funct::SLT, 1, 2, 3, 0), Op::Slt),
        (encode_r(funct::SLTU, 1, 2, 3, 0), Op::Sltu),
        (encode_regimm(regimm::BLTZ, 7, 0x0040), Op::Bltz),
        (encode_regimm(regimm::BGEZ, 7, 0xfffe), Op::Bgez),
        (encode_regimm(regimm::BLTZAL, 7, 0x0040), Op::Bltzal),
        (encode_regimm(regimm::BGEZAL, 7, 0x0040), Op::Bgezal),
        (encode_j(op::J, 0x012_3456), Op::J),
        (encode_j(op::JAL, 0x3ff_ffff), Op::Jal),
        (encode_i(op::BEQ, 1, 2, 0x0010), Op::Beq),
        (encode_i(op::BNE, 1, 2, 0xfff0), Op::Bne),
        (encode_i(op::BLEZ, 1, 0, 0x0010), Op::Blez),
        (encode_i(op::BGTZ, 1, 0, 0x0010), Op::Bgtz),
        (encode_i(op::ADDI, 1, 2, 0x7fff), Op::Addi),
        (encode_i(op::ADDIU, 1, 2, 0x8000), Op::Addiu),
        (encode_i(op::SLTI, 1, 2, 0xffff), Op::Slti),
        (encode_i(op::SLTIU, 1, 2, 0x0001), Op::Sltiu),
        (encode_i(op::ANDI, 1, 2, 0xf0f0), Op::Andi),
        (encode_i(op::ORI, 1, 2, 0x0f0f), Op::Ori),
        (encode_i(op::XORI, 1, 2, 0xaaaa), Op::Xori),
        (encode_i(op::LUI, 0, 2, 0x8002), Op::Lui),
        (encode_i(op::LB, 29, 8, 0xfffc), Op::Lb),
        (encode_i(op::LH, 29, 8, 0x0002), Op::Lh),
        (encode_i(op::LW, 29, 8, 0x0004), Op::Lw),
        (encode_i(op::LBU, 29, 8, 0x0001), Op::Lbu),
        (encode_i(op::LHU, 29, 8, 0x0006), Op::Lhu),
        (encode_i(op::SB, 29, 8, 0x0003), Op::Sb),
        (encode_i(op::SH, 29, 8, 0x0002), Op::Sh),
        (encode_i(op::SW, 29, 8, 0x0000), Op::Sw),
        (encode_cop0(cop0::MFC0, 5, 12), Op::Mfc0),
        (encode_cop0(cop0::MTC0, 5, 14), Op::Mtc0),
    ]
}

#[test]
fn every_operation_round_trips() {
    for (word, expected) in sample_words() {
        let inst = decode(word).unwrap_or_else(|t| panic!("{:#010x} must decode: {}", word, t));
        assert_eq!(inst.op, expected, "operation of {:#010x}", word);
        assert_eq!(inst.word, word, "original word is preserved");
        assert_eq!(
            inst.encode(),
            word,
            "re-encoding {:?} must reproduce {:#010x}",
            expected,
            word
        );
    }
}

#[test]
fn fields_extract_correctly() {
    let inst = decode(encode_r(funct::ADD, 1, 2, 3, 0)).unwrap();
    assert_eq!((inst.rs, inst.rt, inst.rd), (1, 2, 3));

    let inst = decode(encode_i(op::ADDI, 4, 5, 0x8000)).unwrap();
    assert_eq!((inst.rs, inst.rt), (4, 5));
    assert_eq!(inst.imm_se(), -0x8000, "immediate sign-extends");
    assert_eq!(inst.imm_ze(), 0x8000, "immediate zero-extends");

    let inst = decode(encode_j(op::J, 0x123_4567)).unwrap();
    assert_eq!(inst.target, 0x123_4567);
    assert_eq!(inst.jump_target(0x8002_0000), 0x848d_159c);
}

#[test]
fn branch_target_is_relative_to_delay_slot() {
    // beq $0, $0, +4 words.
    let inst = decode(encode_i(op::BEQ, 0, 0, 4)).unwrap();
    assert_eq!(inst.branch_target(0x8002_0000), 0x8002_0014);
    // Negative displacement.
    let inst = decode(encode_i(op::BEQ, 0, 0, 0xffff)).unwrap();
    assert_eq!(inst.branch_target(0x8002_0000), 0x8002_0000);
}

#[test]
fn unknown_encodings_are_rejected() {
    for word in [
        0xffff_ffffu32,
        encode_r(0x3f, 0, 0, 0, 0),
        (0x13 << 26),
        (op::REGIMM << 26) | (0x0f << 16),
    ] {
        match decode(word) {
            Err(Trap::UnsupportedInstruction(w)) => assert_eq!(w, word),
            other => panic!("{:#010x} must be rejected, got {:?}", word, other),
        }
    }
}

#[test]
fn nop_is_all_zeros() {
    let inst = decode(0).unwrap();
    assert!(inst.is_nop());
    assert_eq!(inst.op, Op::Sll);
}
