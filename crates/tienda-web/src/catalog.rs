//! SQLite catalog store.
//!
//! Schema and seed data mirror the storefront's catalog: categories,
//! products, services and contact messages. Read paths degrade instead of
//! failing: list queries return an empty vector and point lookups `None`, so
//! pages still render with a "no results" state when the database is down.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection, OptionalExtension, Result};
use serde::Serialize;
use tracing::warn;

#[derive(Debug, Clone, Serialize)]
pub struct Categoria {
    pub id: i64,
    pub nombre: String,
    pub descripcion: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Producto {
    pub id: i64,
    pub categoria_id: i64,
    pub imagen: String,
    pub nombre: String,
    pub condicion: String,
    pub descripcion: String,
    pub caracteristicas: String,
    pub precio: f64,
    pub cantidad_disponible: i64,
    pub disponible: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Servicio {
    pub id: i64,
    pub imagen: String,
    pub nombre: String,
    pub descripcion: String,
    pub disponible: bool,
}

#[derive(Debug, Clone)]
pub struct NuevoProducto {
    pub categoria_id: i64,
    pub imagen: String,
    pub nombre: String,
    pub condicion: String,
    pub descripcion: String,
    pub caracteristicas: String,
    pub precio: f64,
    pub cantidad_disponible: i64,
    pub disponible: bool,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct CatalogStats {
    pub productos: i64,
    pub categorias: i64,
    pub servicios: i64,
}

pub struct Catalog {
    conn: Mutex<Connection>,
}

const PRODUCTO_COLUMNS: &str = "id, categoria_id, imagen, nombre, condicion, descripcion, \
     caracteristicas, precio, cantidad_disponible, disponible";

impl Catalog {
    /// Open (or create) the catalog database, initializing schema and seed
    /// data on first use.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let catalog = Self {
            conn: Mutex::new(conn),
        };
        catalog.init_schema()?;
        catalog.seed_if_empty()?;
        Ok(catalog)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let catalog = Self {
            conn: Mutex::new(conn),
        };
        catalog.init_schema()?;
        catalog.seed_if_empty()?;
        Ok(catalog)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock().expect("catalog lock poisoned");
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS categoria (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                nombre TEXT NOT NULL,
                descripcion TEXT DEFAULT ''
            );
            CREATE TABLE IF NOT EXISTS producto (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                categoria_id INTEGER,
                imagen TEXT DEFAULT '',
                nombre TEXT NOT NULL,
                condicion TEXT DEFAULT 'Nuevo',
                descripcion TEXT DEFAULT '',
                caracteristicas TEXT DEFAULT '',
                precio REAL NOT NULL,
                cantidad_disponible INTEGER DEFAULT 0,
                disponible INTEGER DEFAULT 1,
                FOREIGN KEY (categoria_id) REFERENCES categoria(id)
            );
            CREATE TABLE IF NOT EXISTS servicio (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                imagen TEXT DEFAULT '',
                nombre TEXT NOT NULL,
                descripcion TEXT DEFAULT '',
                disponible INTEGER DEFAULT 1
            );
            CREATE TABLE IF NOT EXISTS contacto (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                nombres TEXT NOT NULL,
                apellidos TEXT DEFAULT '',
                telefono_fijo TEXT DEFAULT '',
                telefono_movil TEXT DEFAULT '',
                correo_electronico TEXT NOT NULL,
                asunto TEXT DEFAULT '',
                mensaje TEXT DEFAULT '',
                fecha_contacto TEXT DEFAULT CURRENT_TIMESTAMP
            );",
        )
    }

    fn seed_if_empty(&self) -> Result<()> {
        let conn = self.conn.lock().expect("catalog lock poisoned");
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM categoria", [], |row| row.get(0))?;
        if count > 0 {
            return Ok(());
        }

        conn.execute_batch(
            "INSERT INTO categoria (nombre, descripcion) VALUES
                ('Computadores', 'Equipos de cómputo de escritorio y portátiles para todos los usos'),
                ('Periféricos', 'Dispositivos que se conectan al computador para mejorar la experiencia'),
                ('Accesorios', 'Complementos para tus dispositivos tecnológicos'),
                ('Redes', 'Equipos para la conectividad y redes de datos'),
                ('Software', 'Programas y aplicaciones para tus dispositivos');
            INSERT INTO producto (categoria_id, imagen, nombre, condicion, descripcion, caracteristicas, precio, cantidad_disponible, disponible) VALUES
                (1, '/img/laptop.jpg', 'Laptop HP Pavilion 15', 'Nuevo', 'Potente laptop con procesador Intel Core i5, ideal para trabajo y estudios.', '- Procesador Intel Core i5 11th Gen\n- 8GB RAM DDR4\n- 512GB SSD\n- Pantalla 15.6\" Full HD\n- Windows 11 Home', 1899000, 10, 1),
                (2, '/img/monitor.jpg', 'Monitor Samsung 24\"', 'Nuevo', 'Monitor Full HD con panel IPS y tiempo de respuesta de 5ms.', '- Tamaño: 24 pulgadas\n- Resolución: 1920x1080 Full HD\n- Panel IPS\n- Tiempo de respuesta: 5ms\n- Puertos: HDMI, VGA', 689000, 15, 1),
                (2, '/img/teclado.jpg', 'Teclado Mecánico RGB', 'Nuevo', 'Teclado mecánico con switches Cherry MX y retroiluminación RGB personalizable.', '- Switches Cherry MX Red\n- Retroiluminación RGB\n- Teclas de doble inyección\n- Cable desmontable USB-C', 249000, 20, 1),
                (3, '/img/impresora.jpg', 'Impresora Multifuncional', 'Nuevo', 'Impresora multifuncional con escáner, fotocopiadora y conectividad WiFi.', '- Funciones: Impresión, copia, escaneo\n- Conectividad WiFi\n- Impresión a doble cara\n- Pantalla táctil de 2.7\"', 599000, 8, 1),
                (4, '/img/router.jpg', 'Router WiFi 6', 'Nuevo', 'Router de última generación con WiFi 6, mayor velocidad y mejor cobertura.', '- WiFi 6 (802.11ax)\n- Velocidad hasta 3000 Mbps\n- 4 antenas de alta ganancia\n- 4 puertos Gigabit', 349000, 12, 1),
                (5, '/img/antivirus.jpg', 'Antivirus Premium', 'Digital', 'Protección completa para todos tus dispositivos, incluye VPN y protección bancaria.', '- Licencia para 5 dispositivos\n- Protección en tiempo real\n- VPN incluida\n- Optimizador de PC', 129000, 999, 1);
            INSERT INTO servicio (imagen, nombre, descripcion, disponible) VALUES
                ('/img/service-maintenance.jpg', 'Mantenimiento de Computadores', 'Servicio completo de mantenimiento preventivo y correctivo para computadores.', 1),
                ('/img/service-repair.jpg', 'Reparación de Equipos', 'Reparamos todo tipo de equipos informáticos con garantía y personal certificado.', 1),
                ('/img/service-network.jpg', 'Instalación de Redes', 'Diseño e implementación de redes para hogares y empresas.', 1),
                ('/img/service-software.jpg', 'Desarrollo de Software', 'Creamos soluciones de software personalizadas para empresas y negocios.', 1),
                ('/img/service-backup.jpg', 'Respaldo y Recuperación de Datos', 'Recuperamos información de dispositivos dañados y configuramos respaldos.', 1);",
        )
    }

    pub fn categorias(&self) -> Vec<Categoria> {
        self.try_categorias().unwrap_or_else(|e| {
            warn!("Error al obtener categorías: {e}");
            Vec::new()
        })
    }

    fn try_categorias(&self) -> Result<Vec<Categoria>> {
        let conn = self.conn.lock().expect("catalog lock poisoned");
        let mut stmt =
            conn.prepare("SELECT id, nombre, descripcion FROM categoria ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok(Categoria {
                id: row.get(0)?,
                nombre: row.get(1)?,
                descripcion: row.get(2)?,
            })
        })?;
        rows.collect()
    }

    pub fn categoria(&self, id: i64) -> Option<Categoria> {
        let conn = self.conn.lock().expect("catalog lock poisoned");
        conn.query_row(
            "SELECT id, nombre, descripcion FROM categoria WHERE id = ?1",
            params![id],
            |row| {
                Ok(Categoria {
                    id: row.get(0)?,
                    nombre: row.get(1)?,
                    descripcion: row.get(2)?,
                })
            },
        )
        .optional()
        .unwrap_or_else(|e| {
            warn!("Error al obtener categoría {id}: {e}");
            None
        })
    }

    pub fn productos(&self) -> Vec<Producto> {
        self.productos_query(
            &format!("SELECT {PRODUCTO_COLUMNS} FROM producto ORDER BY id"),
            params![],
        )
    }

    pub fn producto(&self, id: i64) -> Option<Producto> {
        let conn = self.conn.lock().expect("catalog lock poisoned");
        conn.query_row(
            &format!("SELECT {PRODUCTO_COLUMNS} FROM producto WHERE id = ?1"),
            params![id],
            row_to_producto,
        )
        .optional()
        .unwrap_or_else(|e| {
            warn!("Error al obtener producto {id}: {e}");
            None
        })
    }

    pub fn productos_por_categoria(&self, categoria_id: i64) -> Vec<Producto> {
        self.productos_query(
            &format!("SELECT {PRODUCTO_COLUMNS} FROM producto WHERE categoria_id = ?1 ORDER BY id"),
            params![categoria_id],
        )
    }

    pub fn buscar_productos(&self, query: &str) -> Vec<Producto> {
        let pattern = format!("%{}%", query.trim());
        self.productos_query(
            &format!(
                "SELECT {PRODUCTO_COLUMNS} FROM producto \
                 WHERE nombre LIKE ?1 OR descripcion LIKE ?1 ORDER BY id"
            ),
            params![pattern],
        )
    }

    pub fn productos_destacados(&self, limit: i64) -> Vec<Producto> {
        self.productos_query(
            &format!(
                "SELECT {PRODUCTO_COLUMNS} FROM producto \
                 WHERE disponible = 1 ORDER BY RANDOM() LIMIT ?1"
            ),
            params![limit],
        )
    }

    fn productos_query(&self, sql: &str, params: impl rusqlite::Params) -> Vec<Producto> {
        let conn = self.conn.lock().expect("catalog lock poisoned");
        let result = conn.prepare(sql).and_then(|mut stmt| {
            let rows = stmt.query_map(params, row_to_producto)?;
            rows.collect::<Result<Vec<_>>>()
        });
        result.unwrap_or_else(|e| {
            warn!("Error al obtener productos: {e}");
            Vec::new()
        })
    }

    pub fn servicios(&self) -> Vec<Servicio> {
        self.servicios_query(
            "SELECT id, imagen, nombre, descripcion, disponible FROM servicio ORDER BY id",
            params![],
        )
    }

    pub fn servicios_destacados(&self, limit: i64) -> Vec<Servicio> {
        self.servicios_query(
            "SELECT id, imagen, nombre, descripcion, disponible FROM servicio \
             WHERE disponible = 1 ORDER BY id LIMIT ?1",
            params![limit],
        )
    }

    fn servicios_query(&self, sql: &str, params: impl rusqlite::Params) -> Vec<Servicio> {
        let conn = self.conn.lock().expect("catalog lock poisoned");
        let result = conn.prepare(sql).and_then(|mut stmt| {
            let rows = stmt.query_map(params, |row| {
                Ok(Servicio {
                    id: row.get(0)?,
                    imagen: row.get(1)?,
                    nombre: row.get(2)?,
                    descripcion: row.get(3)?,
                    disponible: row.get(4)?,
                })
            })?;
            rows.collect::<Result<Vec<_>>>()
        });
        result.unwrap_or_else(|e| {
            warn!("Error al obtener servicios: {e}");
            Vec::new()
        })
    }

    pub fn guardar_contacto(
        &self,
        nombres: &str,
        apellidos: &str,
        telefono: &str,
        email: &str,
        asunto: &str,
        mensaje: &str,
    ) -> Result<i64> {
        let conn = self.conn.lock().expect("catalog lock poisoned");
        conn.execute(
            "INSERT INTO contacto (nombres, apellidos, telefono_movil, correo_electronico, asunto, mensaje) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![nombres, apellidos, telefono, email, asunto, mensaje],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn stats(&self) -> CatalogStats {
        let conn = self.conn.lock().expect("catalog lock poisoned");
        let count = |table: &str| -> i64 {
            conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                row.get(0)
            })
            .unwrap_or(0)
        };
        CatalogStats {
            productos: count("producto"),
            categorias: count("categoria"),
            servicios: count("servicio"),
        }
    }

    pub fn crear_producto(&self, nuevo: &NuevoProducto) -> Result<i64> {
        let conn = self.conn.lock().expect("catalog lock poisoned");
        conn.execute(
            "INSERT INTO producto (categoria_id, imagen, nombre, condicion, descripcion, \
             caracteristicas, precio, cantidad_disponible, disponible) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                nuevo.categoria_id,
                nuevo.imagen,
                nuevo.nombre,
                nuevo.condicion,
                nuevo.descripcion,
                nuevo.caracteristicas,
                nuevo.precio,
                nuevo.cantidad_disponible,
                nuevo.disponible,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn editar_producto(&self, id: i64, nuevo: &NuevoProducto) -> Result<bool> {
        let conn = self.conn.lock().expect("catalog lock poisoned");
        let changed = conn.execute(
            "UPDATE producto SET categoria_id = ?1, imagen = ?2, nombre = ?3, condicion = ?4, \
             descripcion = ?5, caracteristicas = ?6, precio = ?7, cantidad_disponible = ?8, \
             disponible = ?9 WHERE id = ?10",
            params![
                nuevo.categoria_id,
                nuevo.imagen,
                nuevo.nombre,
                nuevo.condicion,
                nuevo.descripcion,
                nuevo.caracteristicas,
                nuevo.precio,
                nuevo.cantidad_disponible,
                nuevo.disponible,
                id,
            ],
        )?;
        Ok(changed > 0)
    }

    pub fn eliminar_producto(&self, id: i64) -> Result<bool> {
        let conn = self.conn.lock().expect("catalog lock poisoned");
        let changed = conn.execute("DELETE FROM producto WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    pub fn crear_categoria(&self, nombre: &str, descripcion: &str) -> Result<i64> {
        let conn = self.conn.lock().expect("catalog lock poisoned");
        conn.execute(
            "INSERT INTO categoria (nombre, descripcion) VALUES (?1, ?2)",
            params![nombre, descripcion],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn editar_categoria(&self, id: i64, nombre: &str, descripcion: &str) -> Result<bool> {
        let conn = self.conn.lock().expect("catalog lock poisoned");
        let changed = conn.execute(
            "UPDATE categoria SET nombre = ?1, descripcion = ?2 WHERE id = ?3",
            params![nombre, descripcion, id],
        )?;
        Ok(changed > 0)
    }

    pub fn eliminar_categoria(&self, id: i64) -> Result<bool> {
        let conn = self.conn.lock().expect("catalog lock poisoned");
        let changed = conn.execute("DELETE FROM categoria WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }
}

fn row_to_producto(row: &rusqlite::Row<'_>) -> Result<Producto> {
    Ok(Producto {
        id: row.get(0)?,
        categoria_id: row.get::<_, Option<i64>>(1)?.unwrap_or(0),
        imagen: row.get(2)?,
        nombre: row.get(3)?,
        condicion: row.get(4)?,
        descripcion: row.get(5)?,
        caracteristicas: row.get(6)?,
        precio: row.get(7)?,
        cantidad_disponible: row.get(8)?,
        disponible: row.get(9)?,
    })
}
