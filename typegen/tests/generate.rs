use std::fs;
use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;
use tempfile::TempDir;
use typegen::{FileStatus, TypegenConfig, TypegenError, generate_types};

const ORDER: &str = r#"import { Entity, PrimaryGeneratedColumn, Column, OneToMany, CreateDateColumn } from 'typeorm';
import { Expose } from 'class-transformer';
import { OrderItem } from './OrderItem';
import { Attachment } from '../interfaces/media';

export enum OrderStatus {
    Pending = 'pending',
    Paid = 'paid',
}

@Entity()
export class Order {
    @PrimaryGeneratedColumn()
    id: number;

    @Column()
    total: number;

    @Column({ type: 'enum', enum: OrderStatus, default: OrderStatus.Pending })
    status: OrderStatus;

    @OneToMany(() => OrderItem, (item) => item.order)
    items: OrderItem[];

    @Column({ type: 'json', nullable: true })
    attachments: Attachment[];

    @CreateDateColumn()
    createdAt: Date;

    @Expose()
    get isPaid(): boolean {
        return this.status === OrderStatus.Paid;
    }
}
"#;

const ORDER_ITEM: &str = r#"import { Entity, PrimaryGeneratedColumn, Column, ManyToOne } from 'typeorm';
import { Order } from './Order';

@Entity()
export class OrderItem {
    @PrimaryGeneratedColumn()
    id: number;

    @ManyToOne(() => Order, (order) => order.items)
    order: Order;

    @Column()
    quantity: number;
}
"#;

const ADMIN_ORDER: &str = r#"import { ChildEntity, Column } from 'typeorm';
import { Order } from './Order';

@ChildEntity()
export class AdminOrder extends Order {
    @Column({ nullable: true })
    approvedBy: string;
}
"#;

const MEDIA: &str = r#"export interface Attachment {
    url: string;
    kind: 'image' | 'video';
}

export interface OrderSummary {
    order: Order;
    status: OrderStatus;
}
"#;

/// A web project next to an api project.
struct Workspace {
    _temp_dir: TempDir,
    api: PathBuf,
    web: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let api = temp_dir.path().join("api");
        let web = temp_dir.path().join("web");
        fs::create_dir_all(api.join("src/entities")).unwrap();
        fs::create_dir_all(&web).unwrap();
        Self {
            _temp_dir: temp_dir,
            api,
            web,
        }
    }

    fn orders() -> Self {
        let workspace = Self::new();
        workspace.entity("Order.ts", ORDER);
        workspace.entity("OrderItem.ts", ORDER_ITEM);
        workspace.entity("AdminOrder.ts", ADMIN_ORDER);
        workspace.interface("media.ts", MEDIA);
        workspace
    }

    fn entity(&self, name: &str, content: &str) {
        fs::write(self.api.join("src/entities").join(name), content).unwrap();
    }

    fn interface(&self, name: &str, content: &str) {
        let dir = self.api.join("src/interfaces");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(name), content).unwrap();
    }

    fn output(&self, relative: &str) -> String {
        fs::read_to_string(self.web.join(relative)).unwrap()
    }
}

fn files_under(dir: &Path) -> Vec<PathBuf> {
    walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path().to_path_buf())
        .collect()
}

#[test]
fn test_order_interface() {
    let workspace = Workspace::orders();
    let report = generate_types().project_dir(&workspace.web).run().unwrap();

    assert_eq!(report.entities, vec!["AdminOrder", "Order", "OrderItem"]);
    assert_eq!(report.warnings().count(), 0);

    let expected = "\
// Generated by typegen. Do not edit manually.

import type { OrderItem } from './OrderItem';
import type { OrderStatus } from '../enums';
import type { Attachment } from '../api';

export interface Order {
    id: number;
    total: number;
    status: OrderStatus;
    items?: OrderItem[];
    attachments?: Attachment[];
    createdAt: string;
    isPaid: boolean;
}
";
    assert_eq!(workspace.output("src/types/entities/Order.ts"), expected);
}

#[test]
fn test_child_entity_flattens_parent() {
    let workspace = Workspace::orders();
    generate_types().project_dir(&workspace.web).run().unwrap();

    let expected = "\
// Generated by typegen. Do not edit manually.

import type { OrderItem } from './OrderItem';
import type { OrderStatus } from '../enums';
import type { Attachment } from '../api';

export interface AdminOrder {
    id: number;
    total: number;
    status: OrderStatus;
    items?: OrderItem[];
    attachments?: Attachment[];
    createdAt: string;
    isPaid: boolean;
    approvedBy?: string;
}
";
    assert_eq!(workspace.output("src/types/entities/AdminOrder.ts"), expected);
}

#[test]
fn test_to_one_relation_imports_target() {
    let workspace = Workspace::orders();
    generate_types().project_dir(&workspace.web).run().unwrap();

    let expected = "\
// Generated by typegen. Do not edit manually.

import type { Order } from './Order';

export interface OrderItem {
    id: number;
    order?: Order;
    quantity: number;
}
";
    assert_eq!(workspace.output("src/types/entities/OrderItem.ts"), expected);
}

#[test]
fn test_barrels() {
    let workspace = Workspace::orders();
    generate_types().project_dir(&workspace.web).run().unwrap();

    assert_eq!(
        workspace.output("src/types/entities/index.ts"),
        "// Generated by typegen. Do not edit manually.\n\n\
         export * from './AdminOrder';\n\
         export * from './Order';\n\
         export * from './OrderItem';\n"
    );

    assert_eq!(
        workspace.output("src/types/enums/index.ts"),
        "// Generated by typegen. Do not edit manually.\n\n\
         export enum OrderStatus {\n    Pending = 'pending',\n    Paid = 'paid',\n}\n"
    );

    let api = "\
// Generated by typegen. Do not edit manually.

import type { Order } from '../entities/Order';
import type { OrderStatus } from '../enums';

export interface Attachment {
    url: string;
    kind: 'image' | 'video';
}

export interface OrderSummary {
    order: Order;
    status: OrderStatus;
}
";
    assert_eq!(workspace.output("src/types/api/index.ts"), api);

    assert_eq!(
        workspace.output("src/types/index.ts"),
        "// Generated by typegen. Do not edit manually.\n\n\
         export * from './api';\n\
         export * from './entities';\n\
         export * from './enums';\n"
    );
    assert_eq!(
        workspace.output("src/index.ts"),
        "// Generated by typegen. Do not edit manually.\n\nexport * from './types';\n"
    );
}

#[test]
fn test_rerun_is_byte_identical_and_unchanged() {
    let workspace = Workspace::orders();
    let first = generate_types().project_dir(&workspace.web).run().unwrap();
    assert_eq!(first.written(), 8);

    let snapshot: Vec<(PathBuf, String)> = files_under(&workspace.web)
        .into_iter()
        .map(|p| {
            let content = fs::read_to_string(&p).unwrap();
            (p, content)
        })
        .collect();

    let second = generate_types().project_dir(&workspace.web).run().unwrap();
    assert_eq!(second.written(), 0);
    assert!(second.files.iter().all(|f| f.status == FileStatus::Unchanged));

    for (path, content) in snapshot {
        assert_eq!(fs::read_to_string(&path).unwrap(), content);
    }
}

#[test]
fn test_three_level_inheritance_across_files() {
    let workspace = Workspace::new();
    workspace.entity(
        "A_Leaf.ts",
        r#"
@ChildEntity()
export class Leaf extends Middle {
    @Column()
    extra: boolean;

    @Expose()
    get isLeaf(): boolean {
        return true;
    }
}
"#,
    );
    workspace.entity(
        "B_Middle.ts",
        r#"
@ChildEntity()
export class Middle extends Root {
    @Column()
    kind: string;
}
"#,
    );
    workspace.entity(
        "C_Root.ts",
        r#"
@Entity()
@TableInheritance({ column: { type: 'varchar', name: 'type' } })
export class Root {
    @PrimaryGeneratedColumn()
    id: number;

    @Expose()
    get label(): string {
        return 'root';
    }
}
"#,
    );

    generate_types().project_dir(&workspace.web).run().unwrap();

    let leaf = workspace.output("src/types/entities/Leaf.ts");
    assert!(leaf.ends_with(
        "export interface Leaf {\n    id: number;\n    label: string;\n    kind: string;\n    extra: boolean;\n    isLeaf: boolean;\n}\n"
    ));
}

#[test]
fn test_excluded_members_never_emitted() {
    let workspace = Workspace::new();
    workspace.entity(
        "User.ts",
        r#"
@Entity()
export class User {
    @PrimaryGeneratedColumn()
    id: number;

    @Column()
    email: string;

    @Exclude()
    @Column()
    password: string;
}
"#,
    );
    workspace.entity(
        "Admin.ts",
        r#"
@ChildEntity()
export class Admin extends User {
    @Column({ default: 1 })
    level: number;
}
"#,
    );

    generate_types().project_dir(&workspace.web).run().unwrap();

    for path in files_under(&workspace.web) {
        let content = fs::read_to_string(&path).unwrap();
        assert!(!content.contains("password"), "{} leaks an excluded member", path.display());
    }
    assert!(
        workspace
            .output("src/types/entities/Admin.ts")
            .contains("    email: string;\n    level: number;\n")
    );
}

#[test]
fn test_self_reference_has_no_import() {
    let workspace = Workspace::new();
    workspace.entity(
        "Category.ts",
        r#"
@Entity()
@Tree('closure-table')
export class Category {
    @PrimaryGeneratedColumn()
    id: number;

    @TreeParent()
    parent: Category;

    @TreeChildren()
    children: Category[];
}
"#,
    );

    let report = generate_types().project_dir(&workspace.web).run().unwrap();
    assert_eq!(report.warnings().count(), 0);

    let expected = "\
// Generated by typegen. Do not edit manually.

export interface Category {
    id: number;
    parent?: Category;
    children?: Category[];
}
";
    assert_eq!(workspace.output("src/types/entities/Category.ts"), expected);
}

#[test]
fn test_union_array_columns_keep_grouping() {
    let workspace = Workspace::new();
    workspace.entity(
        "Asset.ts",
        r#"
@Entity()
export class Asset {
    @PrimaryGeneratedColumn()
    id: number;

    @Column('simple-array')
    kinds: ('image' | 'video')[];

    @Column('simple-array')
    sizes: Array<number | string>;

    @Column()
    matrix: string[][];
}
"#,
    );

    generate_types().project_dir(&workspace.web).run().unwrap();

    let expected = "\
// Generated by typegen. Do not edit manually.

export interface Asset {
    id: number;
    kinds: ('image' | 'video')[];
    sizes: (number | string)[];
    matrix: string[][];
}
";
    assert_eq!(workspace.output("src/types/entities/Asset.ts"), expected);
}

#[test]
fn test_unresolved_relation_is_soft_failure() {
    let workspace = Workspace::new();
    workspace.entity(
        "Review.ts",
        r#"
@Entity()
export class Review {
    @ManyToOne(() => Product)
    product: Product;
}
"#,
    );

    let report = generate_types().project_dir(&workspace.web).run().unwrap();
    assert_eq!(report.warnings().count(), 1);

    let content = workspace.output("src/types/entities/Review.ts");
    assert!(content.contains("    product?: Product;\n"));
    assert!(!content.contains("import"));
}

#[test]
fn test_missing_source_writes_nothing() {
    let workspace = Workspace::new();
    fs::remove_dir_all(workspace.api.join("src/entities")).unwrap();

    let err = generate_types().project_dir(&workspace.web).run().unwrap_err();
    match err {
        TypegenError::SourceNotFound { tried } => {
            assert_eq!(tried.len(), 4);
            assert!(tried[0].ends_with("../api"));
        }
        other => panic!("expected SourceNotFound, got {other}"),
    }
    assert!(files_under(&workspace.web).is_empty());

    let message = generate_types()
        .project_dir(&workspace.web)
        .source_root(workspace.api.clone())
        .run()
        .unwrap_err()
        .to_string();
    assert!(message.contains(&workspace.api.display().to_string()));
}

#[test]
fn test_strict_and_lenient_parsing() {
    let workspace = Workspace::new();
    workspace.entity(
        "Broken.ts",
        r#"
@Entity()
export class Broken {
    @PrimaryGeneratedColumn()
    id: number;
}

export function helper( {
"#,
    );

    let err = generate_types().project_dir(&workspace.web).strict(true).run().unwrap_err();
    assert!(matches!(err, TypegenError::Parse { .. }));
    assert!(files_under(&workspace.web).is_empty());

    let report = generate_types().project_dir(&workspace.web).run().unwrap();
    assert_eq!(report.entities, vec!["Broken"]);
    assert_eq!(report.warnings().count(), 1);
    assert!(workspace.output("src/types/entities/Broken.ts").contains("    id: number;\n"));
}

#[test]
fn test_configured_layout() {
    let workspace = Workspace::orders();
    let mut config = TypegenConfig::default();
    config.output.types_dir = "shared".to_string();
    config.output.auxiliary_module = "../../interfaces".to_string();
    config.output.root_barrel = false;

    let output = workspace.web.join("out");
    generate_types()
        .config(config)
        .source_root(&workspace.api)
        .output_root(&output)
        .run()
        .unwrap();

    let order = fs::read_to_string(output.join("shared/entities/Order.ts")).unwrap();
    assert!(order.contains("import type { Attachment } from '../../interfaces';\n"));
    assert!(!output.join("index.ts").exists());
}
